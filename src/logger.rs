//! Debug logging.
//!
//! `log` records and `tracing` events share one sink. Nothing is written
//! until [`configure`] selects a log file or console echo for the run.

use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, OnceLock};
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
};

/// Targets of the HTTP stack, silenced unless `http_trace` is set
const HTTP_TARGETS: &[&str] = &["reqwest", "hyper", "h2", "rustls", "want", "mio"];

/// Where debug output goes for this run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogOptions {
    /// Append records to this file
    pub file: Option<PathBuf>,
    /// Mirror `log` records to stdout
    pub echo: bool,
    /// Let HTTP client internals through the filter
    pub http_trace: bool,
}

#[derive(Default)]
struct Sink {
    active: bool,
    echo: bool,
    http_trace: bool,
    file: Option<File>,
}

impl Sink {
    fn append(&mut self, bytes: &[u8]) {
        if let Some(file) = self.file.as_mut() {
            // A failing log file must never abort the commit flow
            let _ = file.write_all(bytes).and_then(|()| file.flush());
        }
    }
}

static SINK: LazyLock<Mutex<Sink>> = LazyLock::new(|| Mutex::new(Sink::default()));

/// Whether a record from `target` at `level` gets written
pub fn accepts(target: &str, level: Level, http_trace: bool) -> bool {
    if level > Level::Debug {
        return false;
    }
    if target.starts_with("auto_commit") {
        return true;
    }
    http_trace || !HTTP_TARGETS.iter().any(|prefix| target.starts_with(prefix))
}

struct SinkLogger;

static LOGGER: SinkLogger = SinkLogger;

impl log::Log for SinkLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        let sink = SINK.lock();
        sink.active && accepts(metadata.target(), metadata.level(), sink.http_trace)
    }

    fn log(&self, record: &Record) {
        let line = format!(
            "{} {} [{}] - {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        );

        let mut sink = SINK.lock();
        if !sink.active || !accepts(record.target(), record.level(), sink.http_trace) {
            return;
        }
        sink.append(line.as_bytes());
        if sink.echo {
            print!("{line}");
        }
    }

    fn flush(&self) {}
}

/// Tracing output goes to the log file only
#[derive(Clone, Copy)]
struct TracingWriter;

impl Write for TracingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut sink = SINK.lock();
        if sink.active {
            sink.append(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> fmt::MakeWriter<'a> for TracingWriter {
    type Writer = TracingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        TracingWriter
    }
}

/// Install the `log` logger and the `tracing` subscriber. Safe to call twice.
pub fn init() -> anyhow::Result<()> {
    static INSTALLED: OnceLock<Result<(), String>> = OnceLock::new();

    INSTALLED
        .get_or_init(install)
        .clone()
        .map_err(anyhow::Error::msg)
}

fn install() -> Result<(), String> {
    let log_result =
        log::set_logger(&LOGGER).map(|()| log::set_max_level(LevelFilter::Debug));

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("auto_commit=debug,warn"));
    let layer = fmt::Layer::new()
        .with_target(true)
        .with_ansi(false)
        .with_timer(fmt::time::ChronoUtc::rfc_3339())
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(TracingWriter);
    let tracing_result =
        tracing::subscriber::set_global_default(Registry::default().with(filter).with(layer));

    match (log_result, tracing_result) {
        (Err(log_err), Err(tracing_err)) => Err(format!(
            "Failed to initialize logging: log={log_err}, tracing={tracing_err}"
        )),
        _ => Ok(()),
    }
}

/// Point the sink at this run's destinations; an empty [`LogOptions`] turns it off
pub fn configure(options: &LogOptions) -> io::Result<()> {
    let file = options.file.as_deref().map(open_append).transpose()?;

    let mut sink = SINK.lock();
    sink.active = file.is_some() || options.echo;
    sink.echo = options.echo;
    sink.http_trace = options.http_trace || http_trace_from_env();
    sink.file = file;
    Ok(())
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn http_trace_from_env() -> bool {
    std::env::var_os("AUTO_COMMIT_VERBOSE").is_some()
        || std::env::var("RUST_LOG").is_ok_and(|v| v.contains("debug") || v.contains("trace"))
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        log::debug!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        log::warn!($($arg)*)
    };
}

/// Emit a tracing event; used around the remote call so span timing lands in the log file
#[macro_export]
macro_rules! trace_debug {
    (target: $target:expr, $($arg:tt)*) => {
        tracing::debug!(target: $target, $($arg)*)
    };
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_filters_http_stack() {
        assert!(accepts("auto_commit::git::files", Level::Debug, false));
        assert!(!accepts("auto_commit::git::files", Level::Trace, false));
        assert!(accepts("git2", Level::Warn, false));
        assert!(!accepts("hyper_util::client", Level::Debug, false));
        assert!(!accepts("reqwest::connect", Level::Debug, false));
        assert!(accepts("reqwest::connect", Level::Debug, true));
    }

    #[test]
    fn test_records_reach_log_file() {
        let dir = tempfile::TempDir::new().expect("Failed to create temporary directory");
        let path = dir.path().join("debug.log");

        init().expect("logger should install");
        configure(&LogOptions {
            file: Some(path.clone()),
            ..LogOptions::default()
        })
        .expect("log file should open");
        log::debug!(target: "auto_commit::git", "reading changes");
        log::debug!(target: "hyper::client::pool", "checkout");
        configure(&LogOptions::default()).expect("disabling should succeed");
        log::debug!(target: "auto_commit::git", "after shutdown");

        let written = std::fs::read_to_string(&path).expect("log file should be readable");
        assert!(written.contains("[auto_commit::git] - reading changes"));
        if !http_trace_from_env() {
            assert!(!written.contains("checkout"));
        }
        assert!(!written.contains("after shutdown"));
    }
}
