//! Logging handle for a run.
//!
//! [`Telemetry::init`] installs the tracing subscriber once at process start
//! and returns a handle that owns the root `run` span. The handle is passed
//! by reference to every component, which instruments its work with a child
//! span from [`Telemetry::component_span`]. [`Telemetry::finish`] closes the
//! run and reports the elapsed time.

use crate::config::LoggingConfig;
use chrono::Local;
use std::error::Error;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;
use tracing::{info, info_span, Span};
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

#[derive(Debug)]
pub struct Telemetry {
    run_span: Span,
    started: Instant,
    log_file: Option<PathBuf>,
}

impl Telemetry {
    /// Install the global subscriber and open the run span.
    ///
    /// Events go to stderr. `RUST_LOG` takes precedence over `config.level`.
    /// When `config.log_dir` is set, events are also written to `{log_dir}/YYYY-MM-DD_HH_MM_SS.log`.
    pub fn init(config: &LoggingConfig) -> Result<Self, Box<dyn Error>> {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

        let log_file = match &config.log_dir {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                Some(dir.join(format!("{}.log", Local::now().format("%Y-%m-%d_%H_%M_%S"))))
            }
            None => None,
        };
        let writer = log_writer(log_file.as_deref())?;

        tfmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(log_file.is_none())
            .with_target(true)
            .with_file(false)
            .with_line_number(false)
            .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
            .try_init()
            .map_err(|e| e.to_string())?;

        let telemetry = Self::new(log_file);
        info!(log_file = ?telemetry.log_file, "Logging initialised");
        Ok(telemetry)
    }

    /// Handle with a fresh run span, without touching the global subscriber.
    pub(crate) fn new(log_file: Option<PathBuf>) -> Self {
        Self {
            run_span: info_span!("run", started_at = %Local::now().format("%Y-%m-%d %H:%M:%S")),
            started: Instant::now(),
            log_file,
        }
    }

    /// Child span of the run for one component.
    pub fn component_span(&self, component: &str) -> Span {
        info_span!(parent: &self.run_span, "component", name = %component)
    }

    /// Close the run, logging how long it took.
    pub fn finish(self) {
        let elapsed = self.started.elapsed();
        self.run_span.in_scope(|| {
            info!(
                ?elapsed,
                secs = elapsed.as_secs(),
                millis = elapsed.subsec_millis(),
                "Execution complete"
            );
        });
    }
}

/// Stderr, teed into `log_file` when one is given.
fn log_writer(log_file: Option<&Path>) -> std::io::Result<BoxMakeWriter> {
    Ok(match log_file {
        Some(path) => {
            let file = File::create(path)?;
            BoxMakeWriter::new(std::io::stderr.and(Mutex::new(file)))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    })
}
