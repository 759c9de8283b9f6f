//! Abstraction over launching the external statistics process.
//!
//! The `ProcessLauncher` trait lets the probe drive a real `dstat` child
//! process in production and a scripted replay in tests.

use std::collections::HashMap;
use std::io::{self, BufRead, BufReader};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread::{self, JoinHandle};

use tracing::debug;

/// Called once per line of the child's standard output, in arrival order.
pub type LineCallback = Box<dyn FnMut(String) + Send + 'static>;

/// Error type for launcher failures.
#[derive(Debug)]
pub enum LaunchError {
    /// No executable was given.
    EmptyCommand,
    /// The process could not be spawned.
    Spawn(io::Error),
    /// The termination signal could not be delivered.
    Signal(String),
    /// Waiting for the process to exit failed.
    Wait(io::Error),
}

impl std::fmt::Display for LaunchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LaunchError::EmptyCommand => write!(f, "empty command line"),
            LaunchError::Spawn(e) => write!(f, "{}", e),
            LaunchError::Signal(msg) => write!(f, "failed to signal process: {}", msg),
            LaunchError::Wait(e) => write!(f, "failed to wait for process: {}", e),
        }
    }
}

impl std::error::Error for LaunchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LaunchError::Spawn(e) | LaunchError::Wait(e) => Some(e),
            _ => None,
        }
    }
}

/// Starts an external process and streams its output lines to a callback.
pub trait ProcessLauncher: Send + Sync {
    /// Handle to a running process, consumed by [`shutdown`](Self::shutdown).
    type Handle: Send;

    /// Launches `argv[0]` with the remaining arguments. `env` is added to
    /// the inherited environment.
    fn launch(
        &self,
        argv: &[String],
        env: &HashMap<String, String>,
        on_line: LineCallback,
    ) -> Result<Self::Handle, LaunchError>;

    /// Stops the process. Returns once its output has been fully delivered.
    fn shutdown(&self, handle: Self::Handle, forceful: bool) -> Result<(), LaunchError>;
}

/// Launcher backed by `std::process::Command`.
///
/// Lines are read on a dedicated `dstat-reader` thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandLauncher;

impl CommandLauncher {
    pub fn new() -> Self {
        Self
    }
}

/// A running child and the thread reading its stdout.
#[derive(Debug)]
pub struct ChildHandle {
    child: Child,
    reader: Option<JoinHandle<()>>,
}

impl ChildHandle {
    pub fn id(&self) -> u32 {
        self.child.id()
    }
}

/// Delivers lines until EOF. Invalid UTF-8 is replaced rather than ending
/// the stream.
fn read_lines(stdout: ChildStdout, mut on_line: LineCallback) {
    let mut reader = BufReader::new(stdout);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                }
                if buf.last() == Some(&b'\r') {
                    buf.pop();
                }
                on_line(String::from_utf8_lossy(&buf).into_owned());
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                debug!("stdout read failed: {}", e);
                break;
            }
        }
    }
}

#[cfg(unix)]
fn terminate(child: &mut Child) -> Result<(), LaunchError> {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    match kill(Pid::from_raw(child.id() as i32), Signal::SIGTERM) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(e) => Err(LaunchError::Signal(e.to_string())),
    }
}

/// No graceful signal outside unix; fall back to kill.
#[cfg(not(unix))]
fn terminate(child: &mut Child) -> Result<(), LaunchError> {
    kill(child)
}

fn kill(child: &mut Child) -> Result<(), LaunchError> {
    match child.kill() {
        Ok(()) => Ok(()),
        // Already exited.
        Err(e) if e.kind() == io::ErrorKind::InvalidInput => Ok(()),
        Err(e) => Err(LaunchError::Signal(e.to_string())),
    }
}

/// Sends the stop signal. A graceful signal that cannot be delivered is
/// followed by a kill, so the child can still be waited for.
fn signal_stop(
    child: &mut Child,
    forceful: bool,
    graceful: fn(&mut Child) -> Result<(), LaunchError>,
) -> Result<(), LaunchError> {
    if forceful {
        return kill(child);
    }
    graceful(child).or_else(|e| {
        debug!("{}, killing process {}", e, child.id());
        kill(child)
    })
}

impl ProcessLauncher for CommandLauncher {
    type Handle = ChildHandle;

    fn launch(
        &self,
        argv: &[String],
        env: &HashMap<String, String>,
        on_line: LineCallback,
    ) -> Result<ChildHandle, LaunchError> {
        let (program, args) = argv.split_first().ok_or(LaunchError::EmptyCommand)?;

        let mut child = Command::new(program)
            .args(args)
            .envs(env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(LaunchError::Spawn)?;

        let Some(stdout) = child.stdout.take() else {
            let _ = kill(&mut child);
            let _ = child.wait();
            return Err(LaunchError::Spawn(io::Error::other("stdout was not captured")));
        };

        let reader = match thread::Builder::new()
            .name("dstat-reader".to_string())
            .spawn(move || read_lines(stdout, on_line))
        {
            Ok(reader) => reader,
            Err(e) => {
                let _ = kill(&mut child);
                let _ = child.wait();
                return Err(LaunchError::Spawn(e));
            }
        };

        debug!("launched {} (pid {})", program, child.id());

        Ok(ChildHandle {
            child,
            reader: Some(reader),
        })
    }

    /// Blocks until the child exits; a child that ignores SIGTERM must be
    /// stopped with `forceful`.
    fn shutdown(&self, mut handle: ChildHandle, forceful: bool) -> Result<(), LaunchError> {
        signal_stop(&mut handle.child, forceful, terminate)?;

        let status = handle.child.wait().map_err(LaunchError::Wait)?;
        debug!("process {} exited: {}", handle.child.id(), status);

        if let Some(reader) = handle.reader.take()
            && reader.join().is_err()
        {
            debug!("reader thread panicked");
        }

        Ok(())
    }
}
