//! ---
//! nd_section: "03-logging"
//! nd_subsection: "module"
//! nd_type: "source"
//! nd_scope: "code"
//! nd_description: "Structured logging setup and run lifecycle events."
//! nd_version: "v0.1.0"
//! nd_owner: "tbd"
//! ---
#![warn(missing_docs)]

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::daily;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable consulted before `RUST_LOG`.
pub const LOG_ENV: &str = "NOISY_DOMINOES_LOG";

const DEFAULT_DIRECTIVE: &str = "info";

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The log directory could not be created.
    #[error("unable to create log directory {path}: {source}")]
    Directory {
        /// Directory that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },
}

/// Console output formats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    /// Human readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    StructuredJson,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "structured-json" | "json" => Ok(LogFormat::StructuredJson),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

/// Logging section of the harness settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Console output format.
    #[serde(default)]
    pub format: LogFormat,
    /// When set, a daily rolling JSON log is also written here.
    #[serde(default)]
    pub directory: Option<PathBuf>,
    /// File name prefix for the rolling log. Defaults to the service name.
    #[serde(default)]
    pub file_prefix: Option<String>,
}

/// Keeps the non-blocking writers flushing until dropped.
///
/// Hold this in `main` for the lifetime of the process.
#[must_use = "dropping the guard stops log delivery"]
pub struct LogGuard {
    _guards: Vec<WorkerGuard>,
}

/// Install the global tracing subscriber.
///
/// `NOISY_DOMINOES_LOG` overrides the filter; when unset the standard
/// `RUST_LOG` is honoured, finally defaulting to `info`. Console output goes
/// to stderr so the simulation's own stdout stays untouched.
pub fn init(service_name: &str, config: &LoggingConfig) -> Result<LogGuard, LoggingError> {
    let mut guards = Vec::new();
    let (stderr_writer, stderr_guard) = tracing_appender::non_blocking(std::io::stderr());
    guards.push(stderr_guard);

    let console_layer = match config.format {
        LogFormat::StructuredJson => fmt::layer()
            .with_target(false)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .json()
            .with_writer(stderr_writer)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(stderr_writer)
            .boxed(),
    };

    let file_layer = match &config.directory {
        Some(directory) => {
            std::fs::create_dir_all(directory).map_err(|source| LoggingError::Directory {
                path: directory.clone(),
                source,
            })?;
            let prefix = config
                .file_prefix
                .clone()
                .unwrap_or_else(|| service_name.to_owned());
            let appender = daily(directory, format!("{}.log", prefix));
            let (file_writer, file_guard) = tracing_appender::non_blocking(appender);
            guards.push(file_guard);
            Some(
                fmt::layer()
                    .with_target(true)
                    .with_timer(fmt::time::UtcTime::rfc_3339())
                    .json()
                    .with_writer(file_writer)
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter())
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .ok();

    tracing::debug!(service = %service_name, format = ?config.format, "tracing initialised");
    Ok(LogGuard { _guards: guards })
}

fn env_filter() -> EnvFilter {
    match std::env::var(LOG_ENV) {
        Ok(directive) => EnvFilter::try_new(&directive).unwrap_or_else(|err| {
            eprintln!(
                "invalid {} directive ({}); defaulting to {} logging",
                LOG_ENV, err, DEFAULT_DIRECTIVE
            );
            EnvFilter::new(DEFAULT_DIRECTIVE)
        }),
        Err(_) => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE)),
    }
}

/// Fields attached to every run lifecycle event.
#[derive(Debug, Default, Clone)]
pub struct LogContext<'a> {
    /// Output directory handed to the simulation.
    pub output_dir: Option<&'a str>,
    /// Noise profile path handed to the simulation.
    pub noise: Option<&'a str>,
    /// Requested number of trials.
    pub trials: Option<u32>,
}

impl<'a> LogContext<'a> {
    /// Create an empty logging context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the output directory.
    pub fn with_output_dir(mut self, dir: &'a str) -> Self {
        self.output_dir = Some(dir);
        self
    }

    /// Attach the noise profile path.
    pub fn with_noise(mut self, noise: &'a str) -> Self {
        self.noise = Some(noise);
        self
    }

    /// Attach the trial count.
    pub fn with_trials(mut self, trials: u32) -> Self {
        self.trials = Some(trials);
        self
    }
}

/// Outcome recorded on run lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The step completed.
    Success,
    /// The step failed or was aborted.
    Fault,
}

impl RunOutcome {
    /// Lowercase label written into the `outcome` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunOutcome::Success => "success",
            RunOutcome::Fault => "fault",
        }
    }
}

/// Emit a standardized run event with a success/fault outcome.
pub fn log_run_event(context: Option<&LogContext>, event: &str, message: &str, outcome: RunOutcome) {
    let default_ctx = LogContext::default();
    let ctx = context.unwrap_or(&default_ctx);
    let output_dir = ctx.output_dir.unwrap_or("");
    let noise = ctx.noise.unwrap_or("");
    let trials = ctx.trials.unwrap_or_default();
    // `tracing::event!` needs a constant level.
    match outcome {
        RunOutcome::Fault => tracing::error!(
            event,
            outcome = outcome.as_str(),
            output_dir,
            noise,
            trials,
            message = %message
        ),
        RunOutcome::Success => tracing::info!(
            event,
            outcome = outcome.as_str(),
            output_dir,
            noise,
            trials,
            message = %message
        ),
    }
}
