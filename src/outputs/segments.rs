//! Segment persistence for result rows.
//!
//! Each call writes one named segment (like a spreadsheet sheet) into the
//! country's output directory. The first segment of a country in a run is
//! written in [`WriteMode::Create`], which replaces whatever the directory
//! held; later segments use [`WriteMode::Append`], which only adds the named
//! segment and leaves sibling segments untouched.

use crate::error::PersistError;
use crate::models::{ResultRow, Segment};
use crate::utils::storage_key;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Start the country's output afresh.
    Create,
    /// Add a segment to the country's existing output.
    Append,
}

/// Narrow persistence interface consumed by the campaign orchestrator.
pub trait ResultSink {
    async fn append(
        &self,
        country: &str,
        category_label: &str,
        rows: &[ResultRow],
        schema: &[&str],
        mode: WriteMode,
    ) -> Result<(), PersistError>;
}

impl<T: ResultSink + ?Sized> ResultSink for &T {
    async fn append(
        &self,
        country: &str,
        category_label: &str,
        rows: &[ResultRow],
        schema: &[&str],
        mode: WriteMode,
    ) -> Result<(), PersistError> {
        (**self).append(country, category_label, rows, schema, mode).await
    }
}

/// Writes segments as JSON files under `{output_dir}/{country}/{category}.json`.
///
/// Both path components come from [`storage_key`], so every country gets its
/// own directory below `output_dir` whatever characters its name holds.
#[derive(Debug, Clone)]
pub struct JsonSegmentSink {
    output_dir: PathBuf,
}

impl JsonSegmentSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn country_dir(&self, country: &str) -> PathBuf {
        self.output_dir.join(storage_key(country))
    }

    /// Country directory, refusing anything that is not a direct child of `output_dir`.
    fn checked_country_dir(&self, country: &str) -> Result<PathBuf, PersistError> {
        let dir = self.country_dir(country);
        if dir.parent() != Some(self.output_dir.as_path()) {
            return Err(PersistError::InvalidTarget {
                label: country.to_string(),
            });
        }
        Ok(dir)
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> PersistError + '_ {
    move |source| PersistError::Io {
        path: path.display().to_string(),
        source,
    }
}

impl ResultSink for JsonSegmentSink {
    #[instrument(level = "info", skip_all, fields(%country, category = %category_label, rows = rows.len(), ?mode))]
    async fn append(
        &self,
        country: &str,
        category_label: &str,
        rows: &[ResultRow],
        schema: &[&str],
        mode: WriteMode,
    ) -> Result<(), PersistError> {
        let dir = self.checked_country_dir(country)?;

        if mode == WriteMode::Create && fs::try_exists(&dir).await.map_err(io_error(&dir))? {
            info!(dir = %dir.display(), "Replacing prior country output");
            fs::remove_dir_all(&dir).await.map_err(io_error(&dir))?;
        }
        fs::create_dir_all(&dir).await.map_err(io_error(&dir))?;

        let segment = Segment {
            country: country.to_string(),
            category: category_label.to_string(),
            schema: schema.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| {
                    schema
                        .iter()
                        .map(|name| row.field(name).unwrap_or_default())
                        .collect()
                })
                .collect(),
        };
        let json = serde_json::to_string_pretty(&segment)?;

        let path = dir.join(format!("{}.json", storage_key(category_label)));
        fs::write(&path, json).await.map_err(io_error(&path))?;
        info!(path = %path.display(), "Wrote segment");
        Ok(())
    }
}

/// Load every segment found under `output_dir/*/*.json`.
///
/// Files that are not segments are skipped.
pub async fn load_segments(output_dir: &Path) -> Result<Vec<Segment>, PersistError> {
    let mut segments = Vec::new();
    let mut countries = fs::read_dir(output_dir).await.map_err(io_error(output_dir))?;

    while let Some(entry) = countries.next_entry().await.map_err(io_error(output_dir))? {
        let country_dir = entry.path();
        if !entry.file_type().await.map_err(io_error(&country_dir))?.is_dir() {
            continue;
        }
        let mut files = fs::read_dir(&country_dir).await.map_err(io_error(&country_dir))?;
        while let Some(file) = files.next_entry().await.map_err(io_error(&country_dir))? {
            let path = file.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let raw = fs::read_to_string(&path).await.map_err(io_error(&path))?;
            match serde_json::from_str::<Segment>(&raw) {
                Ok(segment) => segments.push(segment),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Not a result segment; skipping"),
            }
        }
    }

    segments.sort_by(|a, b| (&a.country, &a.category).cmp(&(&b.country, &b.category)));
    Ok(segments)
}
