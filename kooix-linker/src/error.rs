// Linker driver errors

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::runtime::RUNTIME_ENV;

/// Step of the native build a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Finding inputs and the runtime support file
    Locate,
    /// IR to object file
    Translate,
    /// Object file plus runtime into an executable
    Link,
    /// Executing the built program
    Run,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Locate => write!(f, "locate"),
            Stage::Translate => write!(f, "translate"),
            Stage::Link => write!(f, "link"),
            Stage::Run => write!(f, "run"),
        }
    }
}

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("invalid arguments: {0} path is empty")]
    MissingInput(&'static str),

    #[error("locate stage failed: IR artifact '{}' not found", .0.display())]
    MissingIr(PathBuf),

    #[error(
        "locate stage failed: native runtime support file not found (set {}); searched: {}",
        RUNTIME_ENV,
        display_paths(.searched)
    )]
    MissingSupportArtifact { searched: Vec<PathBuf> },

    #[error("{stage} stage failed: required tool '{tool}' not found in PATH")]
    ToolNotFound { stage: Stage, tool: String },

    #[error("{stage} stage failed: could not run '{tool}': {source}")]
    Spawn {
        stage: Stage,
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{stage} stage failed: '{tool}' {}", describe_exit(*.status, .stderr))]
    StageFailed {
        stage: Stage,
        tool: String,
        /// `None` when the tool was killed by a signal
        status: Option<i32>,
        stderr: String,
    },

    #[error("{stage} stage timed out after {timeout_ms} ms")]
    TimedOut { stage: Stage, timeout_ms: u64 },

    #[error("{stage} stage failed: {context}: {source}")]
    Io {
        stage: Stage,
        context: String,
        #[source]
        source: io::Error,
    },
}

impl LinkError {
    /// Stage the error is attributed to
    pub fn stage(&self) -> Stage {
        match self {
            LinkError::MissingInput(_)
            | LinkError::MissingIr(_)
            | LinkError::MissingSupportArtifact { .. } => Stage::Locate,
            LinkError::ToolNotFound { stage, .. }
            | LinkError::Spawn { stage, .. }
            | LinkError::StageFailed { stage, .. }
            | LinkError::TimedOut { stage, .. }
            | LinkError::Io { stage, .. } => *stage,
        }
    }

    /// Exit status of the failed tool, if it exited normally
    pub fn exit_status(&self) -> Option<i32> {
        match self {
            LinkError::StageFailed { status, .. } => *status,
            _ => None,
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_exit(status: Option<i32>, stderr: &str) -> String {
    let mut message = match status {
        Some(code) => format!("exited with status {}", code),
        None => "was terminated by a signal".to_string(),
    };
    if !stderr.is_empty() {
        message.push_str(":\n");
        message.push_str(stderr);
    }
    message
}
