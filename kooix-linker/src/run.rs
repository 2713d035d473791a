// Running a freshly built executable

use crate::driver::LinkerDriver;
use crate::error::{LinkError, Stage};
use crate::process;
use crate::shell::render_command;
use std::path::Path;
use std::process::{Command, Stdio};

/// What a finished program left behind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    /// `None` when the program was killed by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

impl LinkerDriver {
    /// Run `executable` with `args`, feeding it `stdin` when given and
    /// capturing both output streams.
    ///
    /// The configured timeout applies; on expiry the program and everything
    /// it started are killed. A nonzero exit is not an error here, it is
    /// reported through [`RunOutput::status`].
    pub fn run(
        &self,
        executable: &Path,
        args: &[String],
        stdin: Option<Vec<u8>>,
    ) -> Result<RunOutput, LinkError> {
        if executable.as_os_str().is_empty() {
            return Err(LinkError::MissingInput("executable"));
        }
        // A bare name would be looked up on PATH instead of run from here
        let program = if executable.components().count() == 1 && executable.is_relative() {
            Path::new(".").join(executable)
        } else {
            executable.to_path_buf()
        };
        log::info!("{}: {}", Stage::Run, render_command(&program, args));

        let mut child = process::isolate(Command::new(&program).args(args))
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| LinkError::Spawn {
                stage: Stage::Run,
                tool: executable.display().to_string(),
                source,
            })?;

        if let Some(data) = stdin {
            process::feed(child.stdin.take(), data);
        }
        let stdout = process::drain(child.stdout.take());
        let stderr = process::drain(child.stderr.take());

        let status = process::wait(&mut child, self.config().timeout).map_err(|source| {
            LinkError::Io {
                stage: Stage::Run,
                context: format!("waiting for '{}'", executable.display()),
                source,
            }
        })?;
        let Some(status) = status else {
            return Err(self.timed_out(Stage::Run));
        };

        let output = RunOutput {
            status: status.code(),
            stdout: process::collect(stdout),
            stderr: process::collect(stderr),
        };
        log::debug!("{} exited with {:?}", executable.display(), output.status);
        Ok(output)
    }
}
