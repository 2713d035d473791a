//! Kooix module loader
//!
//! Turns an entry file and everything reachable through its top-level
//! `import "path";` directives into a single compilation unit:
//!
//! - [`path`]: specifier resolution and extension inference
//! - [`locate`]: file reading with the bounded `../` search
//! - [`flatten`]: the depth-first traversal that orders modules
//! - [`source_map`] / [`graph`]: what the traversal produces

pub mod error;
pub mod flatten;
pub mod graph;
pub mod locate;
pub mod path;
pub mod source_map;

pub use error::LoadError;
pub use flatten::Flattener;
pub use graph::{ImportCycle, ImportEdge, ModuleGraph, ModuleNode};
pub use locate::{locate_and_read, DiskReader, LocatedSource, SourceReader, MAX_PARENT_LEVELS};
pub use path::{resolve, ModulePath, SOURCE_EXTENSION};
pub use source_map::{SourceFile, SourceMap, SourcePosition};

/// Flatten `entry` from the local filesystem
pub fn flatten(entry: &str) -> Result<String, LoadError> {
    Flattener::new().flatten(entry)
}

/// Flatten `entry` from the local filesystem, keeping the segment table and
/// module graph
pub fn load_source_map(entry: &str) -> Result<(SourceMap, ModuleGraph), LoadError> {
    Flattener::new().load(entry)
}
