//! # Observability
//!
//! Centralized observability layer for the outgo workspace.
//!
//! ## Design Philosophy
//!
//! Services are **log producers**, not log consumers. They call
//! `observability::init()` once at startup and use standard `tracing`
//! macros throughout their code. They have zero knowledge of where logs
//! go or who reads them.
//!
//! Each service writes structured JSONL to its own file under
//! `~/.outgo/logs/<service>.jsonl`, which enables:
//! - `tail -f ~/.outgo/logs/mutation-apply-worker.jsonl | jq` for
//!   pretty streaming
//! - `lnav` for interactive exploration
//!
//! Multi-process safety comes from append-only writes with per-line
//! flush semantics.
//!
//! ## Usage
//!
//! ```rust,ignore
//! fn main() {
//!     observability::init("mutation-apply-worker");
//!     tracing::info!("service started");
//! }
//! ```

use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the service (e.g., "mutation-apply-worker").
    /// Selects the log file the service writes to.
    pub service_name: String,

    /// Default log level filter (e.g., "debug", "info", "warn").
    /// Can be overridden by the `RUST_LOG` environment variable.
    pub default_level: String,

    /// Optional custom log file path.
    /// Defaults to `~/.outgo/logs/<service>.jsonl`.
    pub log_path: Option<PathBuf>,

    /// Also emit logs to stderr for immediate feedback.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
        }
    }
}

/// Per-service log file location.
fn default_log_path(service_name: &str) -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".outgo")
        .join("logs")
        .join(format!("{service_name}.jsonl"))
}

/// Appending file writer with per-line flush, safe to share across
/// threads and processes.
#[derive(Clone)]
pub struct LogWriter {
    inner: Arc<Mutex<BufWriter<File>>>,
}

impl LogWriter {
    pub fn new(path: &PathBuf) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            inner: Arc::new(Mutex::new(BufWriter::with_capacity(8192, file))),
        })
    }
}

impl io::Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self.inner.lock();
        let result = guard.write(buf);
        // Flush after each write so concurrent readers and sibling
        // processes see complete lines.
        guard.flush()?;
        result
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.lock().flush()
    }
}

/// MakeWriter implementation for tracing-subscriber.
#[derive(Clone)]
struct WriterFactory {
    writer: LogWriter,
}

impl<'a> MakeWriter<'a> for WriterFactory {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.writer.clone()
    }
}

/// Initialize the observability layer with default settings.
///
/// This is the zero-config entry point; services call it once at startup.
///
/// # Panics
///
/// Panics if the log file cannot be created or opened, or if a global
/// subscriber is already installed.
pub fn init(service_name: &str) {
    init_with_config(LogConfig {
        service_name: service_name.into(),
        ..Default::default()
    });
}

/// Initialize the observability layer with custom configuration.
pub fn init_with_config(config: LogConfig) {
    let log_path = config
        .log_path
        .clone()
        .unwrap_or_else(|| default_log_path(&config.service_name));

    let writer = LogWriter::new(&log_path)
        .unwrap_or_else(|e| panic!("failed to open log file {:?}: {}", log_path, e));
    let factory = WriterFactory { writer };

    let file_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_target(true)
        .with_writer(factory)
        .with_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.default_level)),
        );

    let stderr_layer = config.also_stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_file(false)
            .with_line_number(false)
            .compact()
            .with_writer(io::stderr)
            .with_ansi(true)
            .with_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(&config.default_level)),
            )
    });

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .init();

    tracing::info!(
        service = %config.service_name,
        log_path = %log_path.display(),
        "observability initialized"
    );
}

/// Re-export tracing macros for convenience.
/// Services can use `observability::info!()` or `tracing::info!()`.
pub use tracing::{debug, error, info, instrument, trace, warn};

/// Re-export the span macro for structured context.
pub use tracing::span;

/// Re-export Level for advanced filtering.
pub use tracing::Level;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::tempdir;

    #[test]
    fn default_config() {
        let config = LogConfig::default();
        assert_eq!(config.service_name, "unknown");
        assert_eq!(config.default_level, "info");
        assert!(config.log_path.is_none());
        assert!(!config.also_stderr);
    }

    #[test]
    fn log_writer_creates_file_and_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("test.jsonl");

        let mut writer = LogWriter::new(&path).unwrap();
        writer.write_all(b"line one\n").unwrap();
        writer.write_all(b"line two\n").unwrap();

        let mut content = String::new();
        File::open(&path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "line one\nline two\n");
    }

    #[test]
    fn log_writer_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deeply").join("nested").join("test.jsonl");

        let writer = LogWriter::new(&path);
        assert!(writer.is_ok());
        assert!(path.parent().unwrap().exists());
    }
}
