// Loader errors

use std::io;
use thiserror::Error;

/// Errors that stop a flatten call.
///
/// The first error met aborts the whole traversal; nothing already combined
/// is returned alongside it.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Neither the path nor any of its `../` variants could be read
    #[error("failed to read file '{path}'")]
    FileNotFound { path: String },

    #[error("failed to read file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid arguments: entry path is empty")]
    EmptyEntry,
}

impl LoadError {
    /// Path the error refers to, if any
    pub fn path(&self) -> Option<&str> {
        match self {
            LoadError::FileNotFound { path } | LoadError::Io { path, .. } => Some(path),
            LoadError::EmptyEntry => None,
        }
    }
}
