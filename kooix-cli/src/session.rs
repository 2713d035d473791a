// Per-invocation context, built once in main and shared read-only

use crate::cli::ToolchainFlags;
use crate::manifest::Manifest;
use anyhow::{Context, Result};
use kooix_linker::{EnvOverrides, Tool, ToolchainConfig};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Session {
    /// Manifest path and contents, if one was found
    pub manifest: Option<(PathBuf, Manifest)>,
    pub env: EnvOverrides,
}

impl Session {
    pub fn load(manifest: Option<&Path>) -> Result<Self> {
        let cwd = env::current_dir().context("Failed to read current directory")?;
        let manifest = Manifest::discover(manifest, &cwd)?;
        Ok(Self {
            manifest,
            env: EnvOverrides::from_env(),
        })
    }

    /// Directory manifest-relative paths are resolved against
    fn manifest_dir(&self) -> Option<&Path> {
        self.manifest
            .as_ref()
            .and_then(|(path, _)| path.parent())
            .filter(|dir| !dir.as_os_str().is_empty())
    }

    /// The entry given on the command line, or the manifest's `entry`
    pub fn entry(&self, given: Option<&str>) -> Result<String> {
        if let Some(entry) = given {
            return Ok(entry.to_string());
        }

        let entry = self
            .manifest
            .as_ref()
            .and_then(|(_, manifest)| manifest.entry.as_deref())
            .context("no entry module given and no manifest `entry` to fall back on")?;

        Ok(match self.manifest_dir() {
            Some(dir) if !entry.starts_with('/') => dir.join(entry).to_string_lossy().into_owned(),
            _ => entry.to_string(),
        })
    }

    /// Toolchain settings: defaults, manifest, environment, then `flags`
    pub fn toolchain(&self, flags: &ToolchainFlags) -> Result<ToolchainConfig> {
        let mut native = self
            .manifest
            .as_ref()
            .and_then(|(_, manifest)| manifest.native.clone());
        if let (Some(native), Some(dir)) = (native.as_mut(), self.manifest_dir()) {
            if let Some(runtime) = native.runtime.as_mut().filter(|p| p.is_relative()) {
                *runtime = dir.join(&*runtime);
            }
        }

        let mut config = ToolchainConfig::resolve(native.as_ref(), &self.env);

        if let Some(command) = &flags.translator {
            config.translator = parse_flag("--translator", command)?;
        }
        if let Some(command) = &flags.linker {
            config.linker = parse_flag("--linker", command)?;
        }
        if let Some(runtime) = &flags.runtime {
            config.runtime.explicit = Some(runtime.clone());
        }
        config.link_args.extend(flags.link_args.iter().cloned());
        if let Some(ms) = flags.timeout_ms {
            config.timeout = Some(Duration::from_millis(ms));
        }

        Ok(config)
    }
}

fn parse_flag(flag: &str, command: &str) -> Result<Tool> {
    Tool::parse(command).with_context(|| format!("{} cannot be blank", flag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kooix_linker::NativeConfig;

    fn session(manifest: Option<(&str, Manifest)>) -> Session {
        Session {
            manifest: manifest.map(|(path, m)| (PathBuf::from(path), m)),
            env: EnvOverrides::default(),
        }
    }

    #[test]
    fn test_entry_from_manifest_is_relative_to_it() {
        let session = session(Some((
            "/work/app/kooix.json",
            Manifest {
                entry: Some("src/main".into()),
                ..Manifest::default()
            },
        )));

        assert_eq!(session.entry(None).unwrap(), "/work/app/src/main");
        assert_eq!(session.entry(Some("other")).unwrap(), "other");
    }

    #[test]
    fn test_entry_missing() {
        assert!(session(None).entry(None).is_err());
    }

    #[test]
    fn test_flags_override_everything() {
        let mut session = session(Some((
            "/work/kooix.json",
            Manifest {
                native: Some(NativeConfig {
                    linker: Some("gcc".into()),
                    runtime: Some(PathBuf::from("rt/runtime.c")),
                    link_args: vec!["-lm".into()],
                    ..NativeConfig::default()
                }),
                ..Manifest::default()
            },
        )));
        session.env.linker = Some("cc".into());

        let config = session.toolchain(&ToolchainFlags::default()).unwrap();
        assert_eq!(config.linker, Tool::new("cc"));
        assert_eq!(
            config.runtime.explicit,
            Some(PathBuf::from("/work/rt/runtime.c"))
        );

        let flags = ToolchainFlags {
            linker: Some("clang-18 -fuse-ld=lld".into()),
            link_args: vec!["-lpthread".into()],
            timeout_ms: Some(10),
            ..ToolchainFlags::default()
        };
        let config = session.toolchain(&flags).unwrap();
        assert_eq!(config.linker, Tool::new("clang-18").arg("-fuse-ld=lld"));
        assert_eq!(config.link_args, vec!["-lm", "-lpthread"]);
        assert_eq!(config.timeout, Some(Duration::from_millis(10)));
    }

    #[test]
    fn test_runtime_precedence() {
        let mut session = session(Some((
            "/work/kooix.json",
            Manifest {
                native: Some(NativeConfig {
                    runtime: Some(PathBuf::from("rt/runtime.c")),
                    ..NativeConfig::default()
                }),
                ..Manifest::default()
            },
        )));
        session.env.runtime = Some(PathBuf::from("/opt/kooix/runtime.c"));

        let config = session.toolchain(&ToolchainFlags::default()).unwrap();
        assert_eq!(
            config.runtime.candidates(),
            vec![PathBuf::from("/opt/kooix/runtime.c")]
        );

        let flags = ToolchainFlags {
            runtime: Some(PathBuf::from("cli/runtime.c")),
            ..ToolchainFlags::default()
        };
        let config = session.toolchain(&flags).unwrap();
        assert_eq!(config.runtime.candidates(), vec![PathBuf::from("cli/runtime.c")]);
    }

    #[test]
    fn test_blank_flag_rejected() {
        let flags = ToolchainFlags {
            translator: Some("  ".into()),
            ..ToolchainFlags::default()
        };
        assert!(session(None).toolchain(&flags).is_err());
    }
}
