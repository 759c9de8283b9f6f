//! Mock process launcher for testing.
//!
//! This module provides `ScriptedLauncher` and pre-built dstat output
//! scenarios for exercising the probe without a real `dstat` binary.

mod launcher;
mod scenarios;

pub use launcher::{LaunchRecord, ScriptedHandle, ScriptedLauncher};
pub use scenarios::{BANNER, HEADER, ROW, ROW_17_COLUMNS, ROW_BAD_SUFFIX};
