//! Destinations for probe diagnostics.
//!
//! The probe reports through two channels: `output` for informational
//! messages and `error` for failures. Warnings go to the output channel
//! unless a sink has a better place for them.

use std::sync::Mutex;

use tracing::{error, info, warn};

pub trait DiagnosticSink: Send + Sync {
    fn output(&self, message: &str);

    fn error(&self, message: &str);

    fn warning(&self, message: &str) {
        self.output(&format!("WARNING: {}", message));
    }
}

/// Forwards diagnostics to `tracing` at matching levels.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn output(&self, message: &str) {
        info!("{}", message);
    }

    fn error(&self, message: &str) {
        error!("{}", message);
    }

    fn warning(&self, message: &str) {
        warn!("{}", message);
    }
}

/// Keeps every message in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    output: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output_messages(&self) -> Vec<String> {
        self.output.lock().map(|m| m.clone()).unwrap_or_default()
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

impl DiagnosticSink for MemorySink {
    fn output(&self, message: &str) {
        if let Ok(mut messages) = self.output.lock() {
            messages.push(message.to_string());
        }
    }

    fn error(&self, message: &str) {
        if let Ok(mut messages) = self.errors.lock() {
            messages.push(message.to_string());
        }
    }
}
