// Child process supervision shared by the build stages and the run step.
// Children get their own process group on unix so a timeout takes down
// everything they started, not just the direct child.

use std::io::{self, Read, Write};
use std::process::{Child, Command, ExitStatus};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Put the command's child in a fresh process group
pub(crate) fn isolate(command: &mut Command) -> &mut Command {
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }
    command
}

/// Read a pipe to the end on a helper thread
pub(crate) fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    })
}

/// Write `data` to the child's stdin on a helper thread, then close it
pub(crate) fn feed<W: Write + Send + 'static>(pipe: Option<W>, data: Vec<u8>) {
    if let Some(mut pipe) = pipe {
        thread::spawn(move || {
            // The child may exit without reading everything
            let _ = pipe.write_all(&data);
        });
    }
}

/// Collected bytes of a drained pipe, lossily decoded
pub(crate) fn collect(reader: Option<JoinHandle<Vec<u8>>>) -> String {
    reader
        .and_then(|reader| reader.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

/// Wait for `child`, up to `limit` when given.
///
/// On expiry the child's whole process group is killed, the child is reaped,
/// and `None` is returned.
pub(crate) fn wait(child: &mut Child, limit: Option<Duration>) -> io::Result<Option<ExitStatus>> {
    let Some(limit) = limit else {
        return child.wait().map(Some);
    };

    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        let now = Instant::now();
        if now >= deadline {
            terminate(child);
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Ok(pid) = libc::pid_t::try_from(child.id()) {
            // SAFETY: signals the group led by our own unreaped child
            if unsafe { libc::kill(-pid, libc::SIGKILL) } != 0 {
                log::debug!(
                    "killing process group {} failed: {}",
                    pid,
                    io::Error::last_os_error()
                );
            }
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}
