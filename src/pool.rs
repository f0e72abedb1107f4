//! Bounded concurrent retrieval of candidate articles.
//!
//! The [`RetrievalPool`] runs the article fetcher and the review classifier
//! over a batch of candidates with at most `max_workers` tasks in flight,
//! and assembles one [`ResultRow`] per candidate. Row order is completion
//! order, not input order.
//!
//! A task that panics is caught and logged; its row is omitted and sibling
//! tasks keep running. Fetch failures are not task failures: they are
//! recorded in the row's download state.

use crate::fetcher::{ArticleFetcher, Extractor};
use crate::models::{Candidate, ResultRow};
use crate::review::classify;
use crate::utils::{format_published_date, format_publisher, upload_timestamp};
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::{debug, error, info, instrument};

/// Default number of concurrently executing retrieval tasks.
pub const DEFAULT_MAX_WORKERS: usize = 5;

/// Row metadata shared by every candidate of one (country, category) batch.
#[derive(Debug, Clone)]
pub struct BatchContext {
    pub country: String,
    pub risk_category_full_name: String,
    pub commodity: String,
    pub lang: String,
    pub data_source: String,
}

/// Worker pool executing fetch + classify per candidate.
///
/// Built once per run and reused for every (country, category) batch.
#[derive(Debug)]
pub struct RetrievalPool<E> {
    fetcher: ArticleFetcher<E>,
    max_workers: usize,
    min_text_length: usize,
}

impl<E> RetrievalPool<E>
where
    E: Extractor,
{
    pub fn new(fetcher: ArticleFetcher<E>, max_workers: usize, min_text_length: usize) -> Self {
        Self {
            fetcher,
            max_workers: max_workers.max(1),
            min_text_length,
        }
    }

    /// Fetch and classify every candidate, returning the rows in completion order.
    #[instrument(level = "info", skip_all, fields(country = %batch.country, category = %batch.risk_category_full_name, candidates = candidates.len()))]
    pub async fn retrieve_all(&self, batch: &BatchContext, candidates: Vec<Candidate>) -> Vec<ResultRow> {
        let total = candidates.len();
        info!(max_workers = self.max_workers, "Starting retrieval batch");

        let rows: Vec<ResultRow> = stream::iter(candidates.into_iter().enumerate())
            .map(|(i, candidate)| async move {
                let url = candidate.url.clone();
                match AssertUnwindSafe(self.retrieve_one(batch, candidate))
                    .catch_unwind()
                    .await
                {
                    Ok(row) => Some(row),
                    Err(panic) => {
                        error!(
                            index = i,
                            %url,
                            error = %panic_message(panic.as_ref()),
                            "Retrieval task failed; omitting row"
                        );
                        None
                    }
                }
            })
            .buffer_unordered(self.max_workers)
            .filter_map(std::future::ready)
            .collect()
            .await;

        info!(
            total,
            rows = rows.len(),
            omitted = total - rows.len(),
            "Completed retrieval batch"
        );
        rows
    }

    async fn retrieve_one(&self, batch: &BatchContext, candidate: Candidate) -> ResultRow {
        let outcome = self.fetcher.fetch(&candidate.url).await;
        let decision = classify(&outcome, self.min_text_length);
        debug!(
            url = %candidate.url,
            status = %outcome.status,
            manual_check = decision.manual_check_suggested,
            "Classified candidate"
        );

        ResultRow {
            country: batch.country.clone(),
            risk_category_full_name: batch.risk_category_full_name.clone(),
            commodity: batch.commodity.clone(),
            lang: batch.lang.clone(),
            prompt: candidate.prompt,
            data_source: batch.data_source.clone(),
            url: candidate.url,
            title: candidate.title,
            published_date: format_published_date(&candidate.published_date),
            publisher: format_publisher(candidate.publisher.as_ref()),
            article_clean_text: outcome.text.unwrap_or_default(),
            download_state: outcome.status,
            manual_check_suggested: decision.manual_check_suggested,
            reason: decision.reason,
            upload_time: upload_timestamp(),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;
    use crate::models::{FetchStatus, RawPublisher, ReviewReason};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Succeeds with 80 characters for URLs containing "ok", panics for
    /// URLs containing "boom", fails otherwise. Tracks peak concurrency.
    #[derive(Default)]
    struct Scripted {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl Extractor for Scripted {
        async fn extract(&self, url: &str, _language: &str) -> Result<String, ExtractError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if url.contains("boom") {
                panic!("extractor blew up on {url}");
            }
            if url.contains("ok") {
                Ok("x".repeat(80))
            } else {
                Err(ExtractError::Download("connection reset".into()))
            }
        }
    }

    fn batch() -> BatchContext {
        BatchContext {
            country: "Ghana".into(),
            risk_category_full_name: "Slavery".into(),
            commodity: "cocoa".into(),
            lang: "en".into(),
            data_source: "Google News".into(),
        }
    }

    fn candidate(url: &str) -> Candidate {
        Candidate {
            url: url.into(),
            title: format!("Title for {url}"),
            published_date: "Mon, 01 Jan 2024 00:00:00 GMT".into(),
            publisher: Some(RawPublisher::Name("Reuters".into())),
            prompt: "Slavery Ghana cocoa".into(),
        }
    }

    fn pool(extractor: &Scripted, max_workers: usize) -> RetrievalPool<&Scripted> {
        let fetcher = ArticleFetcher::with_policy(extractor, "en", 3, Duration::ZERO);
        RetrievalPool::new(fetcher, max_workers, 50)
    }

    #[tokio::test]
    async fn test_mixed_batch_yields_one_row_per_candidate() {
        let extractor = Scripted::default();
        let candidates = vec![
            candidate("https://a.example/ok-1"),
            candidate("https://b.example/ok-2"),
            candidate("https://c.example/down"),
        ];

        let rows = pool(&extractor, 2).retrieve_all(&batch(), candidates).await;

        assert_eq!(rows.len(), 3);
        let passed = rows.iter().filter(|r| !r.manual_check_suggested).count();
        assert_eq!(passed, 2);
        let failed: Vec<_> = rows.iter().filter(|r| r.manual_check_suggested).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].reason, Some(ReviewReason::DownloadFailed));
        assert_eq!(failed[0].url, "https://c.example/down");
        assert!(failed[0].article_clean_text.is_empty());
    }

    #[tokio::test]
    async fn test_total_failure_still_yields_every_row() {
        let extractor = Scripted::default();
        let candidates: Vec<_> = (0..7)
            .map(|i| candidate(&format!("https://down.example/{i}")))
            .collect();

        let rows = pool(&extractor, 3).retrieve_all(&batch(), candidates).await;

        assert_eq!(rows.len(), 7);
        for row in &rows {
            assert!(matches!(row.download_state, FetchStatus::Failed(_)));
            assert!(row.manual_check_suggested);
            assert_eq!(row.reason, Some(ReviewReason::DownloadFailed));
        }
        let urls: HashSet<_> = rows.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls.len(), 7);
    }

    #[tokio::test]
    async fn test_concurrency_never_exceeds_max_workers() {
        let extractor = Scripted::default();
        let candidates: Vec<_> = (0..12)
            .map(|i| candidate(&format!("https://ok.example/{i}")))
            .collect();

        let rows = pool(&extractor, 4).retrieve_all(&batch(), candidates).await;

        assert_eq!(rows.len(), 12);
        let peak = extractor.peak.load(Ordering::SeqCst);
        assert!(peak <= 4, "peak concurrency {peak} exceeded limit");
        assert!(peak > 1, "expected concurrent execution, peak was {peak}");
    }

    #[tokio::test]
    async fn test_panicking_task_is_omitted_without_aborting_batch() {
        let extractor = Scripted::default();
        let candidates = vec![
            candidate("https://a.example/ok"),
            candidate("https://b.example/boom"),
            candidate("https://c.example/down"),
        ];

        let rows = pool(&extractor, 2).retrieve_all(&batch(), candidates).await;

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| !r.url.contains("boom")));
    }

    #[tokio::test]
    async fn test_row_carries_batch_and_formatted_candidate_fields() {
        let extractor = Scripted::default();
        let rows = pool(&extractor, 1)
            .retrieve_all(&batch(), vec![candidate("https://a.example/ok")])
            .await;

        let row = &rows[0];
        assert_eq!(row.country, "Ghana");
        assert_eq!(row.risk_category_full_name, "Slavery");
        assert_eq!(row.commodity, "cocoa");
        assert_eq!(row.data_source, "Google News");
        assert_eq!(row.prompt, "Slavery Ghana cocoa");
        assert_eq!(row.published_date, "Jan 2024");
        assert_eq!(row.publisher, "Reuters");
        assert_eq!(row.download_state, FetchStatus::Success);
        assert_eq!(row.article_clean_text.len(), 80);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let extractor = Scripted::default();
        let rows = pool(&extractor, 5).retrieve_all(&batch(), Vec::new()).await;
        assert!(rows.is_empty());
    }

    #[test]
    fn test_panic_message_variants() {
        let boxed: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(boxed.as_ref()), "static");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(boxed.as_ref()), "owned");
        let boxed: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }
}
