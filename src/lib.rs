//! dstatprobe - system metrics probe built on `dstat`.
//!
//! This library provides:
//! - `collector` - launching dstat, parsing its output, probe lifecycle
//! - `storage` - sample model and the drainable sample buffer
//! - `config` - property lookup and dstat command resolution
//!
//! The `dstatprobed` binary runs a probe and prints drained samples.

pub mod collector;
pub mod config;
pub mod storage;
