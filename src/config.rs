//! YAML configuration for a run.
//!
//! ```yaml
//! components:
//!   - news_retrieval
//!   - data_analysis
//! logging:
//!   level: info
//!   log_dir: ./logs
//! retrieval:
//!   commodity: cocoa
//!   countries: [Ghana, Cote d'Ivoire]
//!   risk_categories: [child_labour, slavery]
//!   start_date: 2018-06-01
//!   end_date: 2024-12-31
//! output:
//!   dir: ./output
//!   clear_before_run: false
//!   on_persist_failure: abort
//! ```
//!
//! Everything except `retrieval.commodity`, `retrieval.countries`,
//! `retrieval.risk_categories` and the date range has a default.

use crate::error::ConfigError;
use crate::fetcher::{DEFAULT_RETRIES, DEFAULT_RETRY_DELAY};
use crate::pool::DEFAULT_MAX_WORKERS;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Components to run, in order.
    #[serde(default = "default_components")]
    pub components: Vec<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// When set, a timestamped log file is written here as well as to stderr.
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    pub commodity: String,
    #[serde(default = "default_language")]
    pub language: String,
    /// Region used by the search provider (`gl`/`ceid`).
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_data_source")]
    pub data_source: String,
    pub countries: Vec<String>,
    pub risk_categories: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_min_text_length")]
    pub min_text_length: usize,
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    #[serde(default = "default_fetch_retries")]
    pub fetch_retries: usize,
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl RetrievalConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// What to do when a segment cannot be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistFailurePolicy {
    /// Stop the run with an error.
    #[default]
    Abort,
    /// Log the failure and continue with the next category.
    Skip,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default)]
    pub clear_before_run: bool,
    #[serde(default)]
    pub on_persist_failure: PersistFailurePolicy,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            clear_before_run: false,
            on_persist_failure: PersistFailurePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_report_name")]
    pub report_name: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            report_name: default_report_name(),
        }
    }
}

fn default_components() -> Vec<String> {
    vec!["news_retrieval".to_string()]
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_language() -> String {
    "en".to_string()
}
fn default_region() -> String {
    "US".to_string()
}
fn default_data_source() -> String {
    "Google News".to_string()
}
fn default_max_results() -> usize {
    20
}
fn default_min_text_length() -> usize {
    50
}
fn default_max_workers() -> usize {
    DEFAULT_MAX_WORKERS
}
fn default_fetch_retries() -> usize {
    DEFAULT_RETRIES
}
fn default_retry_delay_secs() -> u64 {
    DEFAULT_RETRY_DELAY.as_secs()
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}
fn default_report_name() -> String {
    "analysis.md".to_string()
}

impl Config {
    /// Read and parse a YAML config file.
    ///
    /// Validation is left to the caller so command-line overrides can be
    /// applied first.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(raw)
    }

    /// Reject values the pipeline cannot run with.
    ///
    /// Unknown risk categories are not rejected here; the orchestrator skips
    /// them with a warning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let r = &self.retrieval;
        if r.countries.is_empty() {
            return Err(invalid("retrieval.countries", "at least one country is required"));
        }
        if r.commodity.trim().is_empty() {
            return Err(invalid("retrieval.commodity", "must not be empty"));
        }
        if r.max_workers == 0 {
            return Err(invalid("retrieval.max_workers", "must be at least 1"));
        }
        if r.fetch_retries == 0 {
            return Err(invalid("retrieval.fetch_retries", "must be at least 1"));
        }
        if r.start_date > r.end_date {
            return Err(invalid(
                "retrieval.start_date",
                format!("{} is after end_date {}", r.start_date, r.end_date),
            ));
        }
        if self.components.is_empty() {
            return Err(invalid("components", "at least one component is required"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}
