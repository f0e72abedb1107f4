//! Markdown report over persisted result segments.
//!
//! The report has four tables:
//! - retrieved URLs per (prompt, risk category, country)
//! - retrieved URLs per publication year
//! - download status per prompt
//! - manual checks suggested per reason

use crate::models::Segment;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Aggregated counts over every row of every segment.
#[derive(Debug, Default, PartialEq)]
pub struct Analysis {
    pub total_rows: usize,
    pub urls_per_prompt: BTreeMap<(String, String, String), usize>,
    /// Keyed by year, `None` for dates that are not in `Mon YYYY` form.
    pub urls_per_year: BTreeMap<Option<i32>, usize>,
    /// (successful, failed) downloads per prompt.
    pub download_status: BTreeMap<String, (usize, usize)>,
    pub manual_checks: BTreeMap<String, usize>,
}

/// Year of a `Mon YYYY` published date (`Jan 2024` -> 2024).
fn published_year(date: &str) -> Option<i32> {
    NaiveDate::parse_from_str(&format!("01 {}", date.trim()), "%d %b %Y")
        .ok()
        .map(|d| d.year())
}

pub fn analyse(segments: &[Segment]) -> Analysis {
    let mut analysis = Analysis::default();

    for segment in segments {
        for row in &segment.rows {
            let cell = |name: &str| segment.cell(row, name).unwrap_or_default().to_string();
            let prompt = cell("prompt");
            analysis.total_rows += 1;

            *analysis
                .urls_per_prompt
                .entry((prompt.clone(), cell("risk_category_full_name"), cell("country")))
                .or_default() += 1;

            *analysis
                .urls_per_year
                .entry(published_year(&cell("published_date")))
                .or_default() += 1;

            let status = analysis.download_status.entry(prompt).or_default();
            if cell("download_state") == "Success" {
                status.0 += 1;
            } else {
                status.1 += 1;
            }

            if cell("manual_check_suggested") == "true" {
                *analysis.manual_checks.entry(cell("reason")).or_default() += 1;
            }
        }
    }
    analysis
}

/// Render the analysis as a Markdown document.
pub fn analysis_to_markdown(analysis: &Analysis, generated_at: &str) -> String {
    let mut md = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(md, "# Risk news retrieval report\n");
    let _ = writeln!(md, "Generated {generated_at}. {} rows analysed.\n", analysis.total_rows);

    let _ = writeln!(md, "## Retrieved URLs per prompt\n");
    let _ = writeln!(md, "| Prompt | Risk category | Country | URLs |");
    let _ = writeln!(md, "|--------|---------------|---------|------|");
    for ((prompt, category, country), count) in &analysis.urls_per_prompt {
        let _ = writeln!(md, "| {prompt} | {category} | {country} | {count} |");
    }

    let _ = writeln!(md, "\n## Retrieved URLs per year\n");
    let _ = writeln!(md, "| Year | URLs |");
    let _ = writeln!(md, "|------|------|");
    for (year, count) in &analysis.urls_per_year {
        let label = year.map_or_else(|| "unknown".to_string(), |y| y.to_string());
        let _ = writeln!(md, "| {label} | {count} |");
    }

    let _ = writeln!(md, "\n## Download status per prompt\n");
    let _ = writeln!(md, "| Prompt | Success | Failed |");
    let _ = writeln!(md, "|--------|---------|--------|");
    for (prompt, (ok, failed)) in &analysis.download_status {
        let _ = writeln!(md, "| {prompt} | {ok} | {failed} |");
    }

    let _ = writeln!(md, "\n## Manual checks suggested\n");
    if analysis.manual_checks.is_empty() {
        let _ = writeln!(md, "No rows need manual review.");
    } else {
        let _ = writeln!(md, "| Reason | Rows |");
        let _ = writeln!(md, "|--------|------|");
        for (reason, count) in &analysis.manual_checks {
            let _ = writeln!(md, "| {reason} | {count} |");
        }
    }
    md
}
