//! Metrics collection from an external `dstat` process.
//!
//! # Usage
//!
//! ## Production
//!
//! ```ignore
//! use std::sync::Arc;
//! use dstatprobe::collector::{CommandLauncher, DstatProbe, TracingSink};
//!
//! let mut probe = DstatProbe::new(CommandLauncher::new(), Arc::new(TracingSink));
//! probe.start(&properties)?;
//! let samples = probe.drain();
//! ```
//!
//! ## Testing (with ScriptedLauncher)
//!
//! ```
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use dstatprobe::collector::{DstatProbe, MemorySink, ScriptedLauncher};
//!
//! let sink = Arc::new(MemorySink::new());
//! let mut probe = DstatProbe::new(ScriptedLauncher::malformed_rows(), sink.clone());
//! probe.start(&HashMap::<String, String>::new()).unwrap();
//! probe.stop();
//! assert_eq!(probe.drain().len(), 2);
//! assert_eq!(sink.error_messages().len(), 2);
//! ```

pub mod dstat;
pub mod mock;
pub mod sink;
pub mod traits;

pub use dstat::{DstatProbe, ProbeError};
pub use mock::ScriptedLauncher;
pub use sink::{DiagnosticSink, MemorySink, TracingSink};
pub use traits::{CommandLauncher, LaunchError, ProcessLauncher};
