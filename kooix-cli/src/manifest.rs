// kooix.json project manifest

use anyhow::{Context, Result};
use kooix_linker::NativeConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "kooix.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Default entry module for `flatten` and `graph`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,

    /// Native toolchain settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native: Option<NativeConfig>,
}

impl Manifest {
    /// Parse kooix.json from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.as_ref().display()))?;

        Self::parse(&content)
            .with_context(|| format!("Invalid manifest {}", path.as_ref().display()))
    }

    /// Parse kooix.json from string
    pub fn parse(content: &str) -> Result<Self> {
        let manifest: Manifest =
            serde_json::from_str(content).context("Failed to parse kooix.json")?;

        if let Some(entry) = &manifest.entry {
            if entry.trim().is_empty() {
                anyhow::bail!("`entry` cannot be empty");
            }
        }
        Ok(manifest)
    }

    /// Load `explicit` if given, otherwise `kooix.json` in `dir` when present
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Option<(PathBuf, Self)>> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = dir.join(MANIFEST_FILE);
                if !candidate.is_file() {
                    return Ok(None);
                }
                candidate
            }
        };

        let manifest = Self::from_file(&path)?;
        log::debug!(
            "using manifest {} (project {})",
            path.display(),
            manifest.name.as_deref().unwrap_or("<unnamed>")
        );
        Ok(Some((path, manifest)))
    }
}
