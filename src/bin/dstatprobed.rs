//! dstatprobed - dstat metrics probe daemon.
//!
//! Runs dstat, collects its samples and prints them to stdout once per
//! reporting interval.

use tikv_jemallocator::Jemalloc;
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use dstatprobe::collector::{CommandLauncher, DstatProbe, TracingSink};
use dstatprobe::config::{OPTS_KEY, PATH_KEY};
use dstatprobe::storage::Sample;

/// Output format for drained samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Comma-separated values with a header row.
    Text,
    /// One JSON object per sample.
    Json,
}

/// dstat metrics probe daemon.
#[derive(Parser)]
#[command(name = "dstatprobed", about = "dstat metrics probe daemon", version)]
struct Args {
    /// Path to the dstat executable.
    #[arg(long)]
    path: Option<String>,

    /// dstat options (e.g., "-m --all --noheaders --noupdate 1").
    #[arg(long, allow_hyphen_values = true)]
    opts: Option<String>,

    /// Extra probe property as key=value. May be repeated.
    #[arg(short = 'D', long = "property", value_name = "KEY=VALUE", value_parser = parse_property)]
    properties: Vec<(String, String)>,

    /// Reporting interval in seconds.
    #[arg(short, long, default_value = "10")]
    interval: u64,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Parses a `key=value` property.
fn parse_property(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid property '{}': expected KEY=VALUE", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid property '{}': empty key", s));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Default level is INFO. Use -q for quiet mode (errors only).
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for target in ["dstatprobed", "dstatprobe"] {
        match format!("{}={}", target, level).parse() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(e) => eprintln!("invalid log directive for {}: {}", target, e),
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Builds probe properties; explicit flags win over `-D` entries.
fn build_properties(args: &Args) -> HashMap<String, String> {
    let mut props: HashMap<String, String> = args.properties.iter().cloned().collect();
    if let Some(ref path) = args.path {
        props.insert(PATH_KEY.to_string(), path.clone());
    }
    if let Some(ref opts) = args.opts {
        props.insert(OPTS_KEY.to_string(), opts.clone());
    }
    props
}

/// Writes drained samples to stdout.
struct Reporter {
    format: Format,
    header_written: bool,
}

impl Reporter {
    fn new(format: Format) -> Self {
        Self {
            format,
            header_written: false,
        }
    }

    fn report(&mut self, metadata: &[String], samples: &[Sample]) -> io::Result<()> {
        if samples.is_empty() {
            return Ok(());
        }

        let stdout = io::stdout();
        let mut out = stdout.lock();

        match self.format {
            Format::Text => {
                if !self.header_written {
                    writeln!(out, "{}", metadata.join(","))?;
                    self.header_written = true;
                }
                for sample in samples {
                    let values: Vec<String> =
                        sample.values().iter().map(|v| v.to_string()).collect();
                    writeln!(out, "{},{}", sample.timestamp_ms(), values.join(","))?;
                }
            }
            Format::Json => {
                for sample in samples {
                    let line = serde_json::to_string(sample).map_err(io::Error::other)?;
                    writeln!(out, "{}", line)?;
                }
            }
        }

        out.flush()
    }
}

fn main() {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    info!("dstatprobed {} starting", env!("CARGO_PKG_VERSION"));
    info!("Config: interval={}s, format={:?}", args.interval, args.format);

    let props = build_properties(&args);
    let mut probe = DstatProbe::new(CommandLauncher::new(), Arc::new(TracingSink));

    if let Err(e) = probe.start(&props) {
        error!("Probe not started: {}", e);
        std::process::exit(1);
    }

    // Setup graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    let metadata = probe.metadata();
    let mut reporter = Reporter::new(args.format);
    let interval = Duration::from_secs(args.interval.max(1));
    let mut reported: u64 = 0;

    while running.load(Ordering::SeqCst) {
        // Sleep with periodic checks for shutdown signal
        let sleep_interval = Duration::from_millis(100);
        let mut remaining = interval;
        while remaining > Duration::ZERO && running.load(Ordering::SeqCst) {
            let sleep_time = remaining.min(sleep_interval);
            std::thread::sleep(sleep_time);
            remaining = remaining.saturating_sub(sleep_time);
        }

        let samples = probe.drain();
        debug!("Drained {} samples", samples.len());
        reported += samples.len() as u64;
        if let Err(e) = reporter.report(&metadata, &samples) {
            error!("Failed to write samples: {}", e);
            break;
        }
    }

    info!("Shutting down...");
    probe.stop();

    let samples = probe.drain();
    reported += samples.len() as u64;
    if let Err(e) = reporter.report(&metadata, &samples) {
        error!("Failed to write samples: {}", e);
    }

    info!("Shutdown complete, {} samples reported", reported);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_property() {
        assert_eq!(
            parse_property("benchmark.probe.dstat.path=/usr/bin/dstat").unwrap(),
            (
                "benchmark.probe.dstat.path".to_string(),
                "/usr/bin/dstat".to_string()
            )
        );
        assert_eq!(
            parse_property("k=a=b").unwrap(),
            ("k".to_string(), "a=b".to_string())
        );
        assert!(parse_property("novalue").is_err());
        assert!(parse_property("=value").is_err());
    }

    #[test]
    fn test_flags_override_properties() {
        let args = Args::parse_from([
            "dstatprobed",
            "-D",
            "benchmark.probe.dstat.path=/from/property",
            "--path",
            "/from/flag",
            "--opts",
            "-m --all 5",
        ]);
        let props = build_properties(&args);
        assert_eq!(props[PATH_KEY], "/from/flag");
        assert_eq!(props[OPTS_KEY], "-m --all 5");
    }
}
