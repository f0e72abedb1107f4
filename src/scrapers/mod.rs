//! External collaborators for finding and reading news articles.
//!
//! Each submodule wraps one outside service behind a small trait so the
//! retrieval pipeline can be driven by fakes in tests:
//!
//! | Collaborator | Module | Trait | Notes |
//! |--------------|--------|-------|-------|
//! | Google News search | [`google_news`] | [`NewsSearch`] | RSS search endpoint, `after:`/`before:` date operators |
//! | Article text | [`article`] | [`crate::fetcher::Extractor`] | HTTP GET + paragraph extraction |

pub mod article;
pub mod google_news;

use crate::error::SearchError;
use crate::models::Candidate;
use chrono::NaiveDate;

/// Parameters of one search request besides the query string.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub language: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub max_results: usize,
}

/// Trait for async news search.
///
/// Implementors return at most `params.max_results` candidates, each tagged
/// with `query` as its originating prompt.
pub trait NewsSearch {
    async fn search(&self, query: &str, params: &SearchParams) -> Result<Vec<Candidate>, SearchError>;
}

impl<T: NewsSearch + ?Sized> NewsSearch for &T {
    async fn search(&self, query: &str, params: &SearchParams) -> Result<Vec<Candidate>, SearchError> {
        (**self).search(query, params).await
    }
}
