//! dstat probe.
//!
//! Runs `dstat` as a child process and turns its text output into
//! [`Sample`]s.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        DstatProbe                        │
//! │   start() / stop()               drain() / metadata()    │
//! │        │                                 ▲               │
//! │ ┌──────▼─────────┐  line   ┌─────────────┴────────────┐  │
//! │ │ProcessLauncher │────────▶│ LineConsumer             │  │
//! │ │ (trait)        │ (reader │  position → LineKind     │  │
//! │ └────────────────┘  thread)│  parser → row → buffer   │  │
//! │                            │  errors → DiagnosticSink │  │
//! │                            └──────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use dstatprobe::collector::dstat::DstatProbe;
//! use dstatprobe::collector::mock::ScriptedLauncher;
//! use dstatprobe::collector::sink::MemorySink;
//!
//! let mut probe = DstatProbe::new(ScriptedLauncher::typical_session(3), Arc::new(MemorySink::new()));
//! probe.start(&HashMap::<String, String>::new()).unwrap();
//! probe.stop();
//! assert_eq!(probe.drain().len(), 3);
//! ```

pub mod consumer;
pub mod error;
pub mod parser;
pub mod row;
pub mod schema;
pub mod units;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::collector::sink::DiagnosticSink;
use crate::collector::traits::ProcessLauncher;
use crate::config::{DstatCommand, Properties};
use crate::storage::{Sample, SampleBuffer};

pub use consumer::LineConsumer;
pub use error::ProbeError;

const PROBE_NAME: &str = "DstatProbe";

/// Lifecycle of a probe: `Idle` → `Running` → `Stopped`.
enum Session<H> {
    Idle,
    Running { handle: H, command: DstatCommand },
    Stopped,
}

/// Collects system metrics from a `dstat` child process.
pub struct DstatProbe<L: ProcessLauncher> {
    launcher: L,
    sink: Arc<dyn DiagnosticSink>,
    buffer: Arc<SampleBuffer>,
    session: Session<L::Handle>,
}

impl<L: ProcessLauncher> DstatProbe<L> {
    pub fn new(launcher: L, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            launcher,
            sink,
            buffer: Arc::new(SampleBuffer::new()),
            session: Session::Idle,
        }
    }

    /// Launches dstat and starts feeding its output to a fresh line consumer.
    ///
    /// A launch failure is reported to the sink and returned. No session is
    /// created, so the probe stays idle and a later `start()` may retry with
    /// corrected properties.
    pub fn start(&mut self, props: &dyn Properties) -> Result<(), ProbeError> {
        match self.session {
            Session::Idle => {}
            Session::Running { .. } => return Err(ProbeError::AlreadyStarted),
            Session::Stopped => return Err(ProbeError::Stopped),
        }

        let command = DstatCommand::resolve(props);
        let mut consumer = LineConsumer::new(self.buffer.clone(), self.sink.clone());

        match self.launcher.launch(
            &command.argv(),
            &HashMap::new(),
            Box::new(move |line: String| consumer.consume(&line)),
        ) {
            Ok(handle) => {
                self.sink.output(&format!(
                    "{} is started. Command: '{}'.",
                    PROBE_NAME, command
                ));
                self.session = Session::Running { handle, command };
                Ok(())
            }
            Err(source) => {
                let err = ProbeError::ProcessLaunch {
                    command: command.to_string(),
                    source,
                };
                self.sink.error(&err.to_string());
                Err(err)
            }
        }
    }

    /// Asks dstat to terminate and waits for its remaining output. No-op
    /// unless running.
    pub fn stop(&mut self) {
        if !self.is_running() {
            return;
        }
        let Session::Running { handle, command } =
            std::mem::replace(&mut self.session, Session::Stopped)
        else {
            return;
        };

        if let Err(e) = self.launcher.shutdown(handle, false) {
            self.sink
                .error(&format!("Failed to stop '{}' process: {}.", command, e));
        }
        debug!("{} stopped, {} samples pending", PROBE_NAME, self.buffer.len());
        self.sink.output(&format!("{} is stopped.", PROBE_NAME));
    }

    /// Names of the reported columns, starting with the timestamp.
    pub fn metadata(&self) -> Vec<String> {
        schema::metadata()
    }

    /// Samples collected since the previous drain.
    pub fn drain(&self) -> Vec<Sample> {
        self.buffer.drain()
    }

    /// Shared handle to the sample buffer, for draining from another thread.
    pub fn buffer(&self) -> Arc<SampleBuffer> {
        self.buffer.clone()
    }

    pub fn is_running(&self) -> bool {
        matches!(self.session, Session::Running { .. })
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self.session, Session::Stopped)
    }
}

impl<L: ProcessLauncher> Drop for DstatProbe<L> {
    /// The child process must not outlive the probe.
    fn drop(&mut self) {
        self.stop();
    }
}
