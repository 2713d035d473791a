//! Native executable driver for Kooix
//!
//! Takes the textual LLVM IR emitted by the compiler and produces an
//! executable in two external steps:
//!
//! ```text
//! llc -relocation-model=pic -filetype=obj app.ll -o app.o
//! clang app.o runtime.c -o app
//! ```
//!
//! Both tools are configurable (see [`ToolchainConfig`]) and are spawned
//! directly with argument vectors, each in its own process group so a stage
//! timeout stops everything the tool started. The runtime support file is
//! found with [`SupportSearch`]. [`LinkerDriver::run`] executes the result.

pub mod config;
pub mod driver;
pub mod error;
mod process;
pub mod run;
pub mod runtime;
pub mod shell;

pub use config::{EnvOverrides, NativeConfig, Tool, ToolchainConfig};
pub use driver::{object_path, LinkerDriver, OBJECT_SUFFIX};
pub use error::{LinkError, Stage};
pub use run::RunOutput;
pub use runtime::{SupportSearch, RUNTIME_ENV};
pub use shell::{render_command, shell_quote};

/// Link `ir` into `output` using defaults plus environment overrides
pub fn link(ir: &std::path::Path, output: &std::path::Path) -> Result<(), LinkError> {
    let config = ToolchainConfig::resolve(None, &EnvOverrides::from_env());
    LinkerDriver::new(config).link(ir, output)
}
