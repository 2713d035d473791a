// Native runtime support file discovery

use crate::error::LinkError;
use std::path::{Path, PathBuf};

/// Overrides the runtime support file location
pub const RUNTIME_ENV: &str = "KOOIX_NATIVE_RUNTIME";

/// How many `../` levels the relative candidates are tried at
pub const MAX_RUNTIME_LEVELS: usize = 8;

/// Relative locations checked from the search root, in order
pub const RUNTIME_CANDIDATES: &[&str] = &[
    "native_runtime/runtime.c",
    "kooix-linker/native_runtime/runtime.c",
];

/// Where the C support file linked into every executable may live.
///
/// Candidates are tried in this order:
/// 1. `explicit`, from the manifest, `KOOIX_NATIVE_RUNTIME` replacing a
///    manifest entry, or the command line; when set it is the only candidate
/// 2. `builtin`, the location known when this crate was built
/// 3. `env_override`, normally taken from `KOOIX_NATIVE_RUNTIME`
/// 4. each of [`RUNTIME_CANDIDATES`] under `search_root`, then under
///    `search_root/..`, up to [`MAX_RUNTIME_LEVELS`] levels up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportSearch {
    pub explicit: Option<PathBuf>,
    pub builtin: Option<PathBuf>,
    pub env_override: Option<PathBuf>,
    /// Directory relative candidates start from; the working directory when `None`
    pub search_root: Option<PathBuf>,
}

impl Default for SupportSearch {
    fn default() -> Self {
        Self {
            explicit: None,
            builtin: Some(Self::builtin_location()),
            env_override: None,
            search_root: None,
        }
    }
}

impl SupportSearch {
    /// Search that only accepts `path`
    pub fn exact(path: impl Into<PathBuf>) -> Self {
        Self {
            explicit: Some(path.into()),
            builtin: None,
            env_override: None,
            search_root: None,
        }
    }

    pub fn builtin_location() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("native_runtime")
            .join("runtime.c")
    }

    /// Every path [`SupportSearch::locate`] would check, in order
    pub fn candidates(&self) -> Vec<PathBuf> {
        if let Some(explicit) = &self.explicit {
            return vec![explicit.clone()];
        }

        let mut candidates = Vec::new();
        candidates.extend(self.builtin.clone());
        candidates.extend(self.env_override.clone());

        let root = self.search_root.clone().unwrap_or_default();
        for relative in RUNTIME_CANDIDATES {
            for level in 0..=MAX_RUNTIME_LEVELS {
                let mut path = root.clone();
                for _ in 0..level {
                    path.push("..");
                }
                path.push(relative);
                candidates.push(path);
            }
        }
        candidates
    }

    /// First candidate that exists as a file
    pub fn locate(&self) -> Result<PathBuf, LinkError> {
        let candidates = self.candidates();
        match candidates.iter().find(|path| path.is_file()) {
            Some(found) => {
                log::debug!("native runtime: {}", found.display());
                Ok(found.clone())
            }
            None => Err(LinkError::MissingSupportArtifact {
                searched: candidates,
            }),
        }
    }
}
