// Toolchain configuration
// Precedence, lowest first: built-in defaults, manifest `native` section,
// environment, command-line flags (applied by the caller on the result)

use crate::runtime::SupportSearch;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TRANSLATOR: &str = "llc";
pub const DEFAULT_LINKER: &str = "clang";
pub const DEFAULT_RELOCATION_MODEL: &str = "pic";

/// Overrides the IR translator command
pub const TRANSLATOR_ENV: &str = "KOOIX_LLC";
/// Overrides the C compiler used as linker driver
pub const LINKER_ENV: &str = "KOOIX_CC";

/// An external program plus the arguments always passed before the
/// stage's own arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tool {
    pub program: String,
    pub args: Vec<String>,
}

impl Tool {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Split a configured command such as `"llc-17 -O2"` on whitespace.
    /// Returns `None` for a blank command.
    pub fn parse(command: &str) -> Option<Self> {
        let mut words = command.split_whitespace();
        let program = words.next()?;
        Some(Self {
            program: program.to_string(),
            args: words.map(str::to_string).collect(),
        })
    }
}

/// The `native` section of `kooix.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NativeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relocation_model: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub link_args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

/// Values read from the process environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub translator: Option<String>,
    pub linker: Option<String>,
    pub runtime: Option<PathBuf>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        let var = |name: &str| env::var(name).ok().filter(|value| !value.trim().is_empty());
        Self {
            translator: var(TRANSLATOR_ENV),
            linker: var(LINKER_ENV),
            runtime: var(crate::runtime::RUNTIME_ENV).map(PathBuf::from),
        }
    }
}

/// Everything the driver needs to run both stages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainConfig {
    pub translator: Tool,
    pub linker: Tool,
    pub relocation_model: String,
    /// Appended after the output path on the link command line
    pub link_args: Vec<String>,
    /// Per-stage limit; `None` waits indefinitely
    pub timeout: Option<Duration>,
    pub runtime: SupportSearch,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            translator: Tool::new(DEFAULT_TRANSLATOR),
            linker: Tool::new(DEFAULT_LINKER),
            relocation_model: DEFAULT_RELOCATION_MODEL.to_string(),
            link_args: Vec::new(),
            timeout: None,
            runtime: SupportSearch::default(),
        }
    }
}

impl ToolchainConfig {
    /// Defaults, then `native`, then `env`
    pub fn resolve(native: Option<&NativeConfig>, env: &EnvOverrides) -> Self {
        let mut config = Self::default();
        if let Some(native) = native {
            config.apply_native(native);
        }
        config.apply_env(env);
        config
    }

    pub fn apply_native(&mut self, native: &NativeConfig) {
        if let Some(tool) = parse_tool("translator", native.translator.as_deref()) {
            self.translator = tool;
        }
        if let Some(tool) = parse_tool("linker", native.linker.as_deref()) {
            self.linker = tool;
        }
        if let Some(model) = &native.relocation_model {
            self.relocation_model = model.clone();
        }
        if let Some(runtime) = &native.runtime {
            self.runtime.explicit = Some(runtime.clone());
        }
        self.link_args.extend(native.link_args.iter().cloned());
        if let Some(ms) = native.timeout_ms {
            self.timeout = Some(Duration::from_millis(ms));
        }
    }

    pub fn apply_env(&mut self, env: &EnvOverrides) {
        if let Some(tool) = parse_tool(TRANSLATOR_ENV, env.translator.as_deref()) {
            self.translator = tool;
        }
        if let Some(tool) = parse_tool(LINKER_ENV, env.linker.as_deref()) {
            self.linker = tool;
        }
        if let Some(runtime) = &env.runtime {
            // A manifest runtime is exact, so the variable takes its place
            if let Some(previous) = &mut self.runtime.explicit {
                log::debug!(
                    "{} replaces configured runtime '{}'",
                    crate::runtime::RUNTIME_ENV,
                    previous.display()
                );
                *previous = runtime.clone();
            }
            self.runtime.env_override = Some(runtime.clone());
        }
    }
}

fn parse_tool(source: &str, command: Option<&str>) -> Option<Tool> {
    let command = command?;
    let tool = Tool::parse(command);
    if tool.is_none() {
        log::warn!("ignoring blank {} command", source);
    }
    tool
}
