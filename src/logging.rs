//! Structured logging setup.
//!
//! Everything in the crate logs through `tracing`. Binaries call
//! [`init_logging`] once at startup; libraries embedding the engine may install
//! their own subscriber instead.
//!
//! | Variable         | Meaning                                   | Default  |
//! |------------------|-------------------------------------------|----------|
//! | `SIF_LOG_LEVEL`  | trace/debug/info/warn/error               | `info`   |
//! | `SIF_LOG_FORMAT` | `json` or `pretty`                        | `json`   |
//! | `SIF_LOG_FILE`   | append to this file instead of stderr     | unset    |
//!
//! `RUST_LOG`, when set, takes precedence over `SIF_LOG_LEVEL`.

use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format: JSON for production, pretty-print for development
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// trace/debug/info/warn/error
    pub log_level: String,
    pub format: LogFormat,
    /// Append here instead of writing to stderr.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Json,
            file: None,
        }
    }
}

impl LogConfig {
    /// Parse configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            log_level: env::var("SIF_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: LogFormat::parse(
                &env::var("SIF_LOG_FORMAT").unwrap_or_else(|_| "json".to_string()),
            ),
            file: env::var("SIF_LOG_FILE")
                .ok()
                .filter(|f| !f.is_empty())
                .map(PathBuf::from),
        }
    }

    /// Human-readable output at debug level, for the CLI's `--verbose`.
    pub fn default_dev() -> Self {
        Self {
            log_level: "debug".to_string(),
            format: LogFormat::Pretty,
            file: None,
        }
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

fn fmt_layer<S, W>(format: LogFormat, writer: W) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    W: for<'w> tracing_subscriber::fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_span_list(true)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(false)
            .with_writer(writer)
            .boxed(),
    }
}

fn file_writer(path: &Path) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .with_context(|| format!("Log file path has no file name: {}", path.display()))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    let appender = tracing_appender::rolling::never(dir, name);
    Ok(tracing_appender::non_blocking(appender))
}

/// Install the global subscriber described by `config`.
///
/// Returns the guard of the background file writer when logging to a file;
/// keep it alive until exit so buffered lines are flushed.
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level().as_str()));
    let registry = tracing_subscriber::registry().with(env_filter);

    match &config.file {
        Some(path) => {
            let (writer, guard) = file_writer(path)?;
            registry
                .with(fmt_layer(config.format, writer))
                .try_init()
                .context("Failed to initialize file logging")?;
            Ok(Some(guard))
        }
        None => {
            registry
                .with(fmt_layer(config.format, std::io::stderr))
                .try_init()
                .context("Failed to initialize logging")?;
            Ok(None)
        }
    }
}
