//! Launcher that replays fixed output instead of running a process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crate::collector::traits::{LaunchError, LineCallback, ProcessLauncher};

/// What the probe asked the launcher to do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaunchRecord {
    /// Command lines passed to `launch`, in call order.
    pub launches: Vec<Vec<String>>,
    /// `forceful` flags passed to `shutdown`, in call order.
    pub shutdowns: Vec<bool>,
}

/// Replays a fixed list of lines on a background thread.
///
/// `shutdown` joins the thread, so once it returns every line has been
/// delivered.
#[derive(Debug, Clone, Default)]
pub struct ScriptedLauncher {
    lines: Vec<String>,
    fail: bool,
    record: Arc<Mutex<LaunchRecord>>,
}

pub struct ScriptedHandle {
    replay: JoinHandle<()>,
}

impl ScriptedLauncher {
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            ..Self::default()
        }
    }

    /// A launcher whose every launch fails as if the executable were missing.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Calls observed so far. Clones share the same record.
    pub fn record(&self) -> LaunchRecord {
        self.record
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl ProcessLauncher for ScriptedLauncher {
    type Handle = ScriptedHandle;

    fn launch(
        &self,
        argv: &[String],
        _env: &HashMap<String, String>,
        mut on_line: LineCallback,
    ) -> Result<ScriptedHandle, LaunchError> {
        if let Ok(mut record) = self.record.lock() {
            record.launches.push(argv.to_vec());
        }

        if argv.is_empty() {
            return Err(LaunchError::EmptyCommand);
        }
        if self.fail {
            return Err(LaunchError::Spawn(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{}: not found", argv[0]),
            )));
        }

        let lines = self.lines.clone();
        let replay = thread::spawn(move || {
            for line in lines {
                on_line(line);
            }
        });

        Ok(ScriptedHandle { replay })
    }

    fn shutdown(&self, handle: ScriptedHandle, forceful: bool) -> Result<(), LaunchError> {
        if let Ok(mut record) = self.record.lock() {
            record.shutdowns.push(forceful);
        }
        handle
            .replay
            .join()
            .map_err(|_| LaunchError::Signal("replay thread panicked".to_string()))
    }
}
