//! Risk campaign orchestration.
//!
//! Walks the cross product of configured countries and risk categories in
//! order. For each pair it builds one search prompt per category keyword,
//! gathers every candidate the search collaborator returns, runs the
//! retrieval pool over them and hands the rows to the sink. Persistence for
//! a pair completes before the next pair starts, so writes to one country's
//! output never interleave.
//!
//! Unknown risk categories and failed searches are logged and skipped.
//! Persistence failures either abort the run or are skipped, depending on
//! [`PersistFailurePolicy`].

use crate::catalog::{find_category, search_prompt};
use crate::config::{PersistFailurePolicy, RetrievalConfig};
use crate::error::PersistError;
use crate::fetcher::Extractor;
use crate::models::{Candidate, ResultRow};
use crate::outputs::segments::{ResultSink, WriteMode};
use crate::pool::{BatchContext, RetrievalPool};
use crate::scrapers::{NewsSearch, SearchParams};
use itertools::Itertools;
use std::collections::HashSet;
use tracing::{error, info, instrument, warn};

/// Inputs of a campaign that do not change between (country, category) pairs.
#[derive(Debug, Clone)]
pub struct CampaignPlan {
    pub commodity: String,
    pub language: String,
    pub data_source: String,
    pub countries: Vec<String>,
    pub risk_categories: Vec<String>,
    pub search: SearchParams,
    pub on_persist_failure: PersistFailurePolicy,
}

impl CampaignPlan {
    pub fn from_config(retrieval: &RetrievalConfig, on_persist_failure: PersistFailurePolicy) -> Self {
        Self {
            commodity: retrieval.commodity.clone(),
            language: retrieval.language.clone(),
            data_source: retrieval.data_source.clone(),
            countries: retrieval.countries.clone(),
            risk_categories: retrieval.risk_categories.clone(),
            search: SearchParams {
                language: retrieval.language.clone(),
                start_date: retrieval.start_date,
                end_date: retrieval.end_date,
                max_results: retrieval.max_results,
            },
            on_persist_failure,
        }
    }
}

/// Counters reported at the end of a campaign.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CampaignReport {
    pub batches_persisted: usize,
    pub rows: usize,
    pub downloaded: usize,
    pub manual_checks: usize,
    pub skipped_categories: Vec<String>,
    pub failed_searches: usize,
    pub failed_persists: usize,
}

pub struct Campaign<S, E, P> {
    search: S,
    pool: RetrievalPool<E>,
    sink: P,
    plan: CampaignPlan,
}

impl<S, E, P> Campaign<S, E, P>
where
    S: NewsSearch,
    E: Extractor,
    P: ResultSink,
{
    pub fn new(search: S, pool: RetrievalPool<E>, sink: P, plan: CampaignPlan) -> Self {
        Self {
            search,
            pool,
            sink,
            plan,
        }
    }

    /// Process every (country, risk category) pair in configuration order.
    ///
    /// # Errors
    ///
    /// Returns the persistence error of the first failed write when the
    /// policy is [`PersistFailurePolicy::Abort`].
    #[instrument(level = "info", skip_all, fields(commodity = %self.plan.commodity))]
    pub async fn run(&self) -> Result<CampaignReport, PersistError> {
        let mut report = CampaignReport::default();
        let mut written_countries: HashSet<&str> = HashSet::new();

        for (country, category_id) in self
            .plan
            .countries
            .iter()
            .cartesian_product(self.plan.risk_categories.iter())
        {
            let Some(category) = find_category(category_id) else {
                warn!(%country, category = %category_id, "Unknown risk category; skipping");
                report.skipped_categories.push(category_id.clone());
                continue;
            };

            let candidates = self.gather_candidates(country, category.keywords, &mut report).await;
            let batch = BatchContext {
                country: country.clone(),
                risk_category_full_name: category.full_name.to_string(),
                commodity: self.plan.commodity.clone(),
                lang: self.plan.language.clone(),
                data_source: self.plan.data_source.clone(),
            };
            let rows = self.pool.retrieve_all(&batch, candidates).await;

            let downloaded = rows.iter().filter(|r| r.download_state.is_success()).count();
            let manual_checks = rows.iter().filter(|r| r.manual_check_suggested).count();
            info!(
                %country,
                category = %category.id,
                rows = rows.len(),
                downloaded,
                manual_checks,
                "Successfully downloaded {} out of {} articles",
                downloaded,
                rows.len()
            );

            let mode = if written_countries.contains(country.as_str()) {
                WriteMode::Append
            } else {
                WriteMode::Create
            };
            match self
                .sink
                .append(country, category.id, &rows, &ResultRow::SCHEMA, mode)
                .await
            {
                Ok(()) => {
                    written_countries.insert(country.as_str());
                    report.batches_persisted += 1;
                    report.rows += rows.len();
                    report.downloaded += downloaded;
                    report.manual_checks += manual_checks;
                }
                Err(e) => match self.plan.on_persist_failure {
                    PersistFailurePolicy::Abort => {
                        error!(%country, category = %category.id, error = %e, "Persisting rows failed; aborting run");
                        return Err(e);
                    }
                    PersistFailurePolicy::Skip => {
                        error!(%country, category = %category.id, error = %e, "Persisting rows failed; skipping category");
                        report.failed_persists += 1;
                    }
                },
            }
        }

        info!(
            batches = report.batches_persisted,
            rows = report.rows,
            downloaded = report.downloaded,
            manual_checks = report.manual_checks,
            skipped_categories = report.skipped_categories.len(),
            failed_searches = report.failed_searches,
            failed_persists = report.failed_persists,
            "Campaign complete"
        );
        Ok(report)
    }

    /// Run one search per keyword and pool the results, each tagged with its prompt.
    async fn gather_candidates(
        &self,
        country: &str,
        keywords: &[&str],
        report: &mut CampaignReport,
    ) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        for keyword in keywords {
            let prompt = search_prompt(keyword, country, &self.plan.commodity);
            match self.search.search(&prompt, &self.plan.search).await {
                Ok(found) => {
                    info!(%prompt, count = found.len(), "Search returned candidates");
                    candidates.extend(found.into_iter().map(|mut c| {
                        c.prompt = prompt.clone();
                        c
                    }));
                }
                Err(e) => {
                    error!(%prompt, error = %e, "Search failed; continuing with next keyword");
                    report.failed_searches += 1;
                }
            }
        }
        candidates
    }
}
