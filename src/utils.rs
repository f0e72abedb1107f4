//! Utility functions for text cleanup, field formatting and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - Text sanitisation for extracted article bodies
//! - Publisher and published-date formatting for result rows
//! - String truncation and slugification for logging and file names
//! - File system validation for the output directory

use crate::models::RawPublisher;
use chrono::{DateTime, Local, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument, warn};

static NON_ASCII_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\x00-\x7F]+").unwrap());

/// Replace every run of non 7-bit characters with a single space.
///
/// Already-sanitised text is a fixed point, so applying this twice is the
/// same as applying it once.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(sanitize_text("caf\u{e9} cr\u{e8}me"), "caf  cr me");
/// assert_eq!(sanitize_text("a\u{2014}\u{2014}b"), "a b");
/// ```
pub fn sanitize_text(text: &str) -> String {
    NON_ASCII_RUN.replace_all(text, " ").into_owned()
}

/// Render the publisher field of a search result.
///
/// Structured publishers yield their `title` (or `"Unknown"` when it is
/// missing); plain names are used as-is; a missing publisher is `"Unknown"`.
pub fn format_publisher(publisher: Option<&RawPublisher>) -> String {
    match publisher {
        Some(RawPublisher::Name(name)) => name.clone(),
        Some(RawPublisher::Record(record)) => record
            .get("title")
            .and_then(|t| t.as_str())
            .unwrap_or("Unknown")
            .to_string(),
        None => "Unknown".to_string(),
    }
}

/// Reformat a provider date (`Mon, 01 Jan 2024 00:00:00 GMT`) to `Jan 2024`.
///
/// The weekday token is ignored, and the zone may be `GMT`, `UTC` or a numeric
/// offset. Strings that do not parse are passed through unchanged.
pub fn format_published_date(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_weekday = trimmed.split_once(',').map_or(trimmed, |(_, rest)| rest.trim());

    if let Some((stamp, "GMT" | "UTC")) = without_weekday.rsplit_once(' ') {
        if let Ok(date) = NaiveDateTime::parse_from_str(stamp, "%d %b %Y %H:%M:%S") {
            return date.format("%b %Y").to_string();
        }
    }
    match DateTime::parse_from_rfc2822(without_weekday) {
        Ok(date) => date.format("%b %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Capture timestamp for result rows, local time.
pub fn upload_timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` bytes (backing off to a character
/// boundary) with an ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Convert a country or category label to a readable slug.
///
/// The result may be empty and different labels may share a slug; use
/// [`storage_key`] for anything that names a file.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(slugify("Côte d'Ivoire"), "côte-divoire");
/// assert_eq!(slugify("child_labour"), "child_labour");
/// ```
pub fn slugify(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .replace(|c: char| !c.is_alphanumeric() && c != ' ' && c != '-' && c != '_', "")
        .replace(' ', "-")
}

/// File-system name for a label: its slug plus a digest of the exact label.
///
/// Never empty, never `.` or `..`, and distinct labels (including ones that
/// only differ in case) get distinct names.
///
/// # Examples
///
/// ```ignore
/// assert!(storage_key("Ghana").starts_with("ghana-"));
/// assert_ne!(storage_key("Ghana"), storage_key("GHANA"));
/// ```
pub fn storage_key(label: &str) -> String {
    let digest = hex::encode(Sha256::digest(label.as_bytes()));
    let slug = slugify(label);
    if slug.is_empty() {
        digest[..12].to_string()
    } else {
        format!("{}-{}", slug, &digest[..12])
    }
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = path.join("..__probe_write__");
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

/// Prepare the output directory for a run, optionally removing prior output.
#[instrument(level = "info", skip_all, fields(path = %path.display(), clear))]
pub async fn prepare_output_dir(path: &Path, clear: bool) -> Result<(), Box<dyn Error>> {
    if clear && fs::try_exists(path).await? {
        warn!("Clearing prior output before run");
        fs::remove_dir_all(path).await?;
    }
    ensure_writable_dir(path).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> RawPublisher {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_sanitize_replaces_non_ascii_runs() {
        assert_eq!(sanitize_text("plain text\n"), "plain text\n");
        assert_eq!(sanitize_text("caf\u{e9}"), "caf ");
        assert_eq!(sanitize_text("a\u{2014}\u{2014}b"), "a b");
        assert_eq!(sanitize_text("a \u{2014} b"), "a   b");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let raw = "Child labour \u{201c}quoted\u{201d} in C\u{f4}te d\u{2019}Ivoire \u{1f600}";
        let once = sanitize_text(raw);
        assert_eq!(sanitize_text(&once), once);
        assert!(once.is_ascii());
    }

    #[test]
    fn test_format_publisher_shapes() {
        assert_eq!(format_publisher(Some(&record(json!({"title": "Reuters"})))), "Reuters");
        assert_eq!(
            format_publisher(Some(&RawPublisher::Name("Reuters".into()))),
            "Reuters"
        );
        assert_eq!(format_publisher(None), "Unknown");
        assert_eq!(
            format_publisher(Some(&record(json!({"href": "https://x.org"})))),
            "Unknown"
        );
    }

    #[test]
    fn test_format_published_date() {
        assert_eq!(format_published_date("Mon, 01 Jan 2024 00:00:00 GMT"), "Jan 2024");
        assert_eq!(format_published_date("Tue, 18 Jun 2019 07:00:00 GMT"), "Jun 2019");
        // weekday that does not match the date
        assert_eq!(format_published_date("Tue, 01 Jan 2024 00:00:00 GMT"), "Jan 2024");
        assert_eq!(format_published_date("Mon, 01 Jan 2024 00:00:00 UTC"), "Jan 2024");
        assert_eq!(format_published_date("Mon, 01 Jan 2024 08:00:00 +0000"), "Jan 2024");
        assert_eq!(format_published_date("01 Jan 2024 00:00:00 GMT"), "Jan 2024");
        assert_eq!(format_published_date("last tuesday"), "last tuesday");
        assert_eq!(format_published_date(""), "");
    }

    #[test]
    fn test_upload_timestamp_shape() {
        let ts = upload_timestamp();
        assert_eq!(ts.len(), 19);
        assert!(chrono::NaiveDateTime::parse_from_str(&ts, "%Y-%m-%d %H:%M:%S").is_ok());
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundaries() {
        let s = "é".repeat(10);
        let result = truncate_for_log(&s, 3);
        assert!(result.starts_with('é'));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Ghana"), "ghana");
        assert_eq!(slugify("Côte d'Ivoire"), "côte-divoire");
        assert_eq!(slugify("child_labour"), "child_labour");
        assert_eq!(slugify("中国"), "中国");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_storage_key_is_never_empty_and_never_shared() {
        let keys: Vec<String> = ["Ghana", "GHANA", "ghana ", "中国", "!!!", "?", ""]
            .iter()
            .map(|label| storage_key(label))
            .collect();

        for key in &keys {
            assert!(!key.is_empty());
            assert!(key != "." && key != "..");
            assert!(!key.contains('/'));
        }
        let unique: std::collections::HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());

        assert_eq!(keys[0], "ghana-583201c1efbf");
        assert_eq!(storage_key("Ghana"), keys[0]);
    }

    #[tokio::test]
    async fn test_prepare_output_dir_clears_prior_output() {
        let dir = std::env::temp_dir().join(format!("risk_news_scout_prepare_{}", std::process::id()));
        fs::create_dir_all(dir.join("ghana")).await.unwrap();
        fs::write(dir.join("ghana/slavery.json"), "{}").await.unwrap();

        prepare_output_dir(&dir, false).await.unwrap();
        assert!(dir.join("ghana/slavery.json").exists());

        prepare_output_dir(&dir, true).await.unwrap();
        assert!(dir.exists());
        assert!(!dir.join("ghana").exists());

        let _ = fs::remove_dir_all(&dir).await;
    }
}
