//! Probe configuration.
//!
//! The probe reads two string properties from whatever key/value source the
//! host provides. Missing or blank values fall back to defaults.

use std::collections::{BTreeMap, HashMap};

/// Property holding the dstat executable.
pub const PATH_KEY: &str = "benchmark.probe.dstat.path";

/// Property holding dstat's command-line options.
pub const OPTS_KEY: &str = "benchmark.probe.dstat.opts";

/// Sampling interval passed to dstat by default, in seconds.
pub const DEFAULT_INTERVAL_SECS: u32 = 1;

pub const DEFAULT_PATH: &str = "dstat";

/// Memory, CPU, disk, network, paging and system stats, no repeated
/// headers, no intermediate updates.
pub fn default_opts() -> String {
    format!("-m --all --noheaders --noupdate {}", DEFAULT_INTERVAL_SECS)
}

/// Key/value lookup supplied by the host.
pub trait Properties {
    fn get(&self, key: &str) -> Option<String>;
}

impl Properties for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

impl Properties for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        BTreeMap::get(self, key).cloned()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Resolved dstat command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DstatCommand {
    pub path: String,
    pub opts: Vec<String>,
}

impl Default for DstatCommand {
    fn default() -> Self {
        Self {
            path: DEFAULT_PATH.to_string(),
            opts: split_opts(&default_opts()),
        }
    }
}

fn split_opts(opts: &str) -> Vec<String> {
    opts.split_ascii_whitespace().map(str::to_string).collect()
}

impl DstatCommand {
    pub fn resolve(props: &dyn Properties) -> Self {
        let path = non_blank(props.get(PATH_KEY))
            .map(|p| p.trim().to_string())
            .unwrap_or_else(|| DEFAULT_PATH.to_string());
        let opts = non_blank(props.get(OPTS_KEY)).unwrap_or_else(default_opts);

        Self {
            path,
            opts: split_opts(&opts),
        }
    }

    /// Executable followed by its options.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.opts.len() + 1);
        argv.push(self.path.clone());
        argv.extend(self.opts.iter().cloned());
        argv
    }
}

impl std::fmt::Display for DstatCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.argv().join(" "))
    }
}
