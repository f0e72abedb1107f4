//! Article text retrieval with bounded retry.
//!
//! This module wraps an extraction collaborator with a fixed number of
//! sequential attempts and a fixed delay between them. It never returns an
//! error: every outcome, including total failure, is a [`FetchOutcome`].
//!
//! # Architecture
//!
//! - [`Extractor`]: core trait for turning a URL into raw article text
//! - [`ArticleFetcher`]: retry decorator that sanitises successful text and
//!   records the last error description on failure
//!
//! # Retry Strategy
//!
//! - Up to `retries` attempts (3 by default)
//! - Fixed delay between attempts (2 seconds by default)
//! - No delay after the final failed attempt

use crate::error::ExtractError;
use crate::models::FetchOutcome;
use crate::utils::sanitize_text;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

/// Attempts per URL when not configured otherwise.
pub const DEFAULT_RETRIES: usize = 3;
/// Wait between attempts when not configured otherwise.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Trait for async article text extraction.
///
/// Implementors download a page and return its raw article text, or an
/// [`ExtractError`] describing why that was not possible. Implementations
/// are shared across concurrent workers through `&self`.
pub trait Extractor {
    async fn extract(&self, url: &str, language: &str) -> Result<String, ExtractError>;
}

impl<T: Extractor + ?Sized> Extractor for &T {
    async fn extract(&self, url: &str, language: &str) -> Result<String, ExtractError> {
        (**self).extract(url, language).await
    }
}

/// Retry wrapper that turns an [`Extractor`] into a total `fetch` operation.
pub struct ArticleFetcher<E> {
    inner: E,
    language: String,
    retries: usize,
    delay: Duration,
}

impl<E> ArticleFetcher<E>
where
    E: Extractor,
{
    /// # Arguments
    ///
    /// * `retries` - Total number of attempts per URL (values below 1 are treated as 1)
    /// * `delay` - Fixed wait between consecutive attempts
    pub fn with_policy(inner: E, language: impl Into<String>, retries: usize, delay: Duration) -> Self {
        Self {
            inner,
            language: language.into(),
            retries: retries.max(1),
            delay,
        }
    }

    /// Retrieve and sanitise the text behind `url`.
    ///
    /// Returns `Success` with sanitised text on the first successful attempt,
    /// otherwise `Failed` with the description of the last error and no text.
    #[instrument(level = "debug", skip_all, fields(%url))]
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        let total_t0 = Instant::now();
        let mut last_error = String::from("no attempt made");

        for attempt in 1..=self.retries {
            match self.inner.extract(url, &self.language).await {
                Ok(raw) => {
                    debug!(
                        attempt,
                        bytes = raw.len(),
                        elapsed_ms_total = total_t0.elapsed().as_millis(),
                        "Extracted article text"
                    );
                    return FetchOutcome::success(sanitize_text(&raw));
                }
                Err(e) => {
                    warn!(
                        attempt,
                        max = self.retries,
                        elapsed_ms_total = total_t0.elapsed().as_millis(),
                        error = %e,
                        "extract() attempt failed"
                    );
                    last_error = e.to_string();
                    if attempt < self.retries {
                        sleep(self.delay).await;
                    }
                }
            }
        }

        warn!(%url, error = %last_error, "fetch exhausted retries");
        FetchOutcome::failed(last_error)
    }
}

impl<E> fmt::Debug for ArticleFetcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArticleFetcher")
            .field("language", &self.language)
            .field("retries", &self.retries)
            .field("delay", &self.delay)
            .finish()
    }
}
