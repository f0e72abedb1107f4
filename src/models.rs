//! Data models for search candidates, fetch outcomes and result rows.
//!
//! This module defines the structures that flow through the retrieval pipeline:
//! - [`Candidate`]: one article surfaced by a search prompt, before its text is fetched
//! - [`FetchOutcome`]: status and sanitised text of one retrieval attempt sequence
//! - [`ReviewDecision`]: whether a human should check the row, and why
//! - [`ResultRow`]: the persisted record, one per candidate
//!
//! [`ResultRow::SCHEMA`] is the ordered field list handed to the persistence
//! collaborator; [`ResultRow::field`] reads a row by those same names.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Publisher field as returned by the search provider.
///
/// Providers return either a plain name or a structured object carrying a
/// `title` (and usually an `href`).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawPublisher {
    Name(String),
    Record(Map<String, Value>),
}

/// One article surfaced by the search collaborator for a given prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub url: String,
    pub title: String,
    /// Published date in the provider's native format (RFC 2822 for Google News).
    pub published_date: String,
    pub publisher: Option<RawPublisher>,
    /// The search prompt that surfaced this article.
    pub prompt: String,
}

/// Download state of a fetch attempt sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    Success,
    /// Description of the last error seen before giving up.
    Failed(String),
}

impl FetchStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchStatus::Success)
    }
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchStatus::Success => f.write_str("Success"),
            FetchStatus::Failed(reason) => write!(f, "Failed: {reason}"),
        }
    }
}

/// Result of retrieving one candidate URL. `text` is `None` on failure.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub status: FetchStatus,
    pub text: Option<String>,
}

impl FetchOutcome {
    pub fn success(text: String) -> Self {
        Self {
            status: FetchStatus::Success,
            text: Some(text),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            status: FetchStatus::Failed(reason.into()),
            text: None,
        }
    }
}

/// Why a row was flagged for manual review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReviewReason {
    DownloadFailed,
    TextRetrievedIsTooSmall,
}

impl ReviewReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewReason::DownloadFailed => "download_failed",
            ReviewReason::TextRetrievedIsTooSmall => "text_retrieved_is_too_small",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewDecision {
    pub manual_check_suggested: bool,
    pub reason: Option<ReviewReason>,
}

/// The durable unit of output: one row per candidate that entered the worker pool.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub country: String,
    pub risk_category_full_name: String,
    pub commodity: String,
    pub lang: String,
    pub prompt: String,
    pub data_source: String,
    pub url: String,
    pub title: String,
    pub published_date: String,
    pub publisher: String,
    /// Sanitised article text; empty when the download failed.
    pub article_clean_text: String,
    pub download_state: FetchStatus,
    pub manual_check_suggested: bool,
    pub reason: Option<ReviewReason>,
    /// Capture time, `YYYY-MM-DD HH:MM:SS` local time.
    pub upload_time: String,
}

impl ResultRow {
    /// Field names in the order every persistence segment uses.
    pub const SCHEMA: [&'static str; 15] = [
        "country",
        "risk_category_full_name",
        "commodity",
        "lang",
        "prompt",
        "data_source",
        "url",
        "title",
        "published_date",
        "publisher",
        "article_clean_text",
        "download_state",
        "manual_check_suggested",
        "reason",
        "upload_time",
    ];

    /// Read a field by its schema name, rendered as a string.
    pub fn field(&self, name: &str) -> Option<String> {
        let value = match name {
            "country" => self.country.clone(),
            "risk_category_full_name" => self.risk_category_full_name.clone(),
            "commodity" => self.commodity.clone(),
            "lang" => self.lang.clone(),
            "prompt" => self.prompt.clone(),
            "data_source" => self.data_source.clone(),
            "url" => self.url.clone(),
            "title" => self.title.clone(),
            "published_date" => self.published_date.clone(),
            "publisher" => self.publisher.clone(),
            "article_clean_text" => self.article_clean_text.clone(),
            "download_state" => self.download_state.to_string(),
            "manual_check_suggested" => self.manual_check_suggested.to_string(),
            "reason" => self.reason.map(|r| r.as_str().to_string()).unwrap_or_default(),
            "upload_time" => self.upload_time.clone(),
            _ => return None,
        };
        Some(value)
    }
}

/// A persisted segment: the rows written for one (country, category) pair.
///
/// Rows are stored as arrays in `schema` order, like a spreadsheet sheet.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Segment {
    pub country: String,
    pub category: String,
    pub schema: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Segment {
    /// Value of `column` in `row`, if the column exists in this segment's schema.
    pub fn cell<'a>(&'a self, row: &'a [String], column: &str) -> Option<&'a str> {
        let idx = self.schema.iter().position(|c| c == column)?;
        row.get(idx).map(String::as_str)
    }
}
