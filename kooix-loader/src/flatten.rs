// Module graph flattening
// Loads an entry module and its transitive imports into one ordered compilation unit

use crate::error::LoadError;
use crate::graph::{ImportCycle, ImportEdge, ModuleGraph, ModuleNode};
use crate::locate::{locate_and_read, DiskReader, SourceReader};
use crate::path::{resolve, ModulePath};
use crate::source_map::SourceMap;
use kooix_scanner::scan_imports;
use std::collections::HashSet;

/// Flattens import graphs read through a [`SourceReader`]
#[derive(Debug, Default, Clone)]
pub struct Flattener<R = DiskReader> {
    reader: R,
}

impl Flattener<DiskReader> {
    pub fn new() -> Self {
        Self { reader: DiskReader }
    }
}

impl<R: SourceReader> Flattener<R> {
    pub fn with_reader(reader: R) -> Self {
        Self { reader }
    }

    /// Combined source text for `entry` and everything it imports
    pub fn flatten(&self, entry: &str) -> Result<String, LoadError> {
        let (map, _) = self.load(entry)?;
        Ok(map.into_combined())
    }

    /// Load `entry` and its transitive imports.
    ///
    /// Each module's imports are loaded, in source order, before the module
    /// itself is appended. A module already visited in this call is skipped,
    /// which both deduplicates diamonds and stops cycles.
    ///
    /// # Errors
    /// The first unreadable module aborts the traversal.
    pub fn load(&self, entry: &str) -> Result<(SourceMap, ModuleGraph), LoadError> {
        if entry.is_empty() {
            return Err(LoadError::EmptyEntry);
        }

        let entry = ModulePath::new(entry);
        let mut session = Session {
            reader: &self.reader,
            visited: HashSet::new(),
            loading: Vec::new(),
            map: SourceMap::default(),
            modules: Vec::new(),
            cycles: Vec::new(),
        };

        session.load_module(&entry, None)?;
        log::debug!(
            "flattened {} module(s) from {}",
            session.modules.len(),
            entry
        );

        Ok((
            session.map,
            ModuleGraph {
                entry,
                modules: session.modules,
                cycles: session.cycles,
            },
        ))
    }
}

/// State owned by a single flatten call
struct Session<'r, R: ?Sized> {
    reader: &'r R,
    visited: HashSet<String>,
    /// Visit keys of modules whose imports are still being loaded
    loading: Vec<String>,
    map: SourceMap,
    modules: Vec<ModuleNode>,
    cycles: Vec<ImportCycle>,
}

impl<R: SourceReader + ?Sized> Session<'_, R> {
    fn load_module(
        &mut self,
        path: &ModulePath,
        importer: Option<&ModulePath>,
    ) -> Result<(), LoadError> {
        let key = path.visit_key();

        if self.visited.contains(&key) {
            match importer {
                Some(importer) if self.loading.contains(&key) => {
                    log::debug!("import cycle: {} -> {}", importer, path);
                    self.cycles.push(ImportCycle {
                        importer: importer.clone(),
                        target: path.clone(),
                    });
                }
                _ => log::debug!("{} already loaded", path),
            }
            return Ok(());
        }
        // Marked before recursing so a cycle back here stops immediately
        self.visited.insert(key.clone());

        let source = locate_and_read(self.reader, path)?;
        log::debug!("loading {}", path);

        let base_dir = path.base_dir();
        let mut imports = Vec::new();

        self.loading.push(key);
        for raw in scan_imports(&source.text) {
            let resolved = resolve(base_dir, &raw);
            self.load_module(&resolved, Some(path))?;
            imports.push(ImportEdge { raw, resolved });
        }
        self.loading.pop();

        self.map.append(path, &source.text);
        self.modules.push(ModuleNode {
            path: path.clone(),
            location: source.location,
            imports,
        });

        Ok(())
    }
}
