// Module graph recorded while flattening

use crate::path::ModulePath;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// One `import "raw";` directive and the path it resolved to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportEdge {
    pub raw: String,
    pub resolved: ModulePath,
}

/// A loaded module
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleNode {
    pub path: ModulePath,
    /// Where the file was read from (differs from `path` after an upward search)
    pub location: PathBuf,
    pub imports: Vec<ImportEdge>,
}

/// An import that pointed back at a module still being loaded.
///
/// Cycles are absorbed, not rejected: the target is simply not loaded again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportCycle {
    pub importer: ModulePath,
    pub target: ModulePath,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleGraph {
    pub entry: ModulePath,
    /// Modules in emission order (dependencies before dependents)
    pub modules: Vec<ModuleNode>,
    pub cycles: Vec<ImportCycle>,
}

impl ModuleGraph {
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Look a module up by path; `a` and `./a.kooix` find the same node
    pub fn node(&self, path: &str) -> Option<&ModuleNode> {
        let key = ModulePath::new(path).visit_key();
        self.modules
            .iter()
            .find(|node| node.path.visit_key() == key)
    }

    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }

    /// Indented import tree rooted at the entry module.
    ///
    /// A module is expanded the first time it appears; later appearances are
    /// marked `(seen)` and import cycles `(cycle)`.
    pub fn render_tree(&self) -> String {
        let nodes: HashMap<String, &ModuleNode> = self
            .modules
            .iter()
            .map(|node| (node.path.visit_key(), node))
            .collect();

        let mut out = String::new();
        let mut expanded = HashSet::new();
        let mut stack = Vec::new();
        self.render_node(&self.entry, 0, &nodes, &mut expanded, &mut stack, &mut out);
        out
    }

    fn render_node(
        &self,
        path: &ModulePath,
        depth: usize,
        nodes: &HashMap<String, &ModuleNode>,
        expanded: &mut HashSet<String>,
        stack: &mut Vec<String>,
        out: &mut String,
    ) {
        let key = path.visit_key();
        let indent = "  ".repeat(depth);

        if stack.contains(&key) {
            out.push_str(&format!("{}{} (cycle)\n", indent, path));
            return;
        }
        if !expanded.insert(key.clone()) {
            out.push_str(&format!("{}{} (seen)\n", indent, path));
            return;
        }

        out.push_str(&format!("{}{}\n", indent, path));

        let Some(node) = nodes.get(&key) else {
            return;
        };
        stack.push(key);
        for edge in &node.imports {
            self.render_node(&edge.resolved, depth + 1, nodes, expanded, stack, out);
        }
        stack.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(path: &str, imports: &[&str]) -> ModuleNode {
        ModuleNode {
            path: ModulePath::new(path),
            location: PathBuf::from(ModulePath::new(path).as_str()),
            imports: imports
                .iter()
                .map(|raw| ImportEdge {
                    raw: raw.to_string(),
                    resolved: ModulePath::new(*raw),
                })
                .collect(),
        }
    }

    #[test]
    fn test_node_lookup() {
        let graph = ModuleGraph {
            entry: ModulePath::new("main"),
            modules: vec![node("lib", &[]), node("main", &["lib"])],
            cycles: vec![],
        };

        assert_eq!(graph.len(), 2);
        assert!(graph.node("./lib.kooix").is_some());
        assert!(graph.node("other").is_none());
    }

    #[test]
    fn test_render_tree() {
        let graph = ModuleGraph {
            entry: ModulePath::new("a"),
            modules: vec![
                node("d", &[]),
                node("b", &["d", "a"]),
                node("c", &["d"]),
                node("a", &["b", "c"]),
            ],
            cycles: vec![ImportCycle {
                importer: ModulePath::new("b"),
                target: ModulePath::new("a"),
            }],
        };

        assert_eq!(
            graph.render_tree(),
            "a.kooix\n  b.kooix\n    d.kooix\n    a.kooix (cycle)\n  c.kooix\n    d.kooix (seen)\n"
        );
        assert!(graph.has_cycles());
    }
}
