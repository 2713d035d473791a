// Native link driver
// IR artifact -> object file (translator) -> executable (C compiler with the runtime)

use crate::config::{Tool, ToolchainConfig};
use crate::error::{LinkError, Stage};
use crate::process;
use crate::shell::render_command;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Appended to the output path to name the intermediate object file
pub const OBJECT_SUFFIX: &str = ".o";

pub struct LinkerDriver {
    config: ToolchainConfig,
}

/// A tool with its program resolved to something spawnable
struct ResolvedTool<'a> {
    name: &'a str,
    program: PathBuf,
    args: &'a [String],
}

impl LinkerDriver {
    pub fn new(config: ToolchainConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ToolchainConfig {
        &self.config
    }

    /// Build `output` from the textual IR at `ir`.
    ///
    /// Inputs, the runtime support file, both tools and the output directory
    /// are checked before anything is spawned. The translate stage must
    /// succeed before the link stage starts. The intermediate object file is
    /// removed after a successful link and left in place after a failure.
    pub fn link(&self, ir: &Path, output: &Path) -> Result<(), LinkError> {
        if ir.as_os_str().is_empty() {
            return Err(LinkError::MissingInput("IR artifact"));
        }
        if output.as_os_str().is_empty() {
            return Err(LinkError::MissingInput("output"));
        }
        if !ir.is_file() {
            return Err(LinkError::MissingIr(ir.to_path_buf()));
        }

        let runtime = self.config.runtime.locate()?;
        let translator = resolve_tool(Stage::Translate, &self.config.translator)?;
        let linker = resolve_tool(Stage::Link, &self.config.linker)?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| LinkError::Io {
                stage: Stage::Locate,
                context: format!("creating output directory '{}'", parent.display()),
                source,
            })?;
        }

        let object = object_path(output);
        self.run_stage(Stage::Translate, &translator, self.translate_args(ir, &object))?;
        self.run_stage(Stage::Link, &linker, self.link_args(&object, &runtime, output))?;

        if let Err(e) = fs::remove_file(&object) {
            log::warn!("could not remove '{}': {}", object.display(), e);
        }
        log::info!("linked {}", output.display());
        Ok(())
    }

    fn translate_args(&self, ir: &Path, object: &Path) -> Vec<OsString> {
        vec![
            format!("-relocation-model={}", self.config.relocation_model).into(),
            "-filetype=obj".into(),
            ir.into(),
            "-o".into(),
            object.into(),
        ]
    }

    fn link_args(&self, object: &Path, runtime: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![object.into(), runtime.into(), "-o".into(), output.into()];
        args.extend(self.config.link_args.iter().map(OsString::from));
        args
    }

    fn run_stage(
        &self,
        stage: Stage,
        tool: &ResolvedTool<'_>,
        stage_args: Vec<OsString>,
    ) -> Result<(), LinkError> {
        let args: Vec<OsString> = tool
            .args
            .iter()
            .map(OsString::from)
            .chain(stage_args)
            .collect();
        log::info!("{}: {}", stage, render_command(tool.name, &args));

        let mut child = process::isolate(Command::new(&tool.program).args(&args))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| LinkError::Spawn {
                stage,
                tool: tool.name.to_string(),
                source,
            })?;

        // Drained on its own thread so a chatty tool cannot block on a full pipe
        let stderr = process::drain(child.stderr.take());

        let status = process::wait(&mut child, self.config.timeout).map_err(|source| {
            LinkError::Io {
                stage,
                context: format!("waiting for '{}'", tool.name),
                source,
            }
        })?;

        let Some(status) = status else {
            return Err(self.timed_out(stage));
        };

        let stderr = process::collect(stderr).trim().to_string();

        if status.success() {
            if !stderr.is_empty() {
                log::debug!("{} stderr: {}", stage, stderr);
            }
            return Ok(());
        }

        Err(LinkError::StageFailed {
            stage,
            tool: tool.name.to_string(),
            status: status.code(),
            stderr,
        })
    }

    pub(crate) fn timed_out(&self, stage: Stage) -> LinkError {
        LinkError::TimedOut {
            stage,
            timeout_ms: self
                .config
                .timeout
                .map_or(0, |t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX)),
        }
    }
}

/// `output` with [`OBJECT_SUFFIX`] appended (`out/app` -> `out/app.o`)
pub fn object_path(output: &Path) -> PathBuf {
    let mut path = output.as_os_str().to_owned();
    path.push(OBJECT_SUFFIX);
    PathBuf::from(path)
}

fn resolve_tool(stage: Stage, tool: &Tool) -> Result<ResolvedTool<'_>, LinkError> {
    let not_found = || LinkError::ToolNotFound {
        stage,
        tool: tool.program.clone(),
    };

    let program = if tool.program.contains(std::path::MAIN_SEPARATOR) || tool.program.contains('/') {
        let path = PathBuf::from(&tool.program);
        if !path.is_file() {
            return Err(not_found());
        }
        path
    } else {
        which::which(&tool.program).map_err(|_| not_found())?
    };

    Ok(ResolvedTool {
        name: &tool.program,
        program,
        args: &tool.args,
    })
}
