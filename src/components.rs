//! Static registry of runnable components.
//!
//! Configuration names the components to run (`components: [...]`). Names
//! are resolved against [`REGISTRY`] at startup, so a typo fails the run
//! before any work starts instead of halfway through it.
//!
//! | Name | Component | Does |
//! |------|-----------|------|
//! | `news_retrieval` | [`NewsRetrieval`] | Search, fetch, classify and persist rows |
//! | `data_analysis` | [`DataAnalysis`] | Summarise persisted rows into a Markdown report |

use crate::campaign::{Campaign, CampaignPlan};
use crate::config::{Config, OutputConfig, RetrievalConfig};
use crate::error::ConfigError;
use crate::fetcher::ArticleFetcher;
use crate::outputs::analysis::{analyse, analysis_to_markdown};
use crate::outputs::segments::{load_segments, JsonSegmentSink};
use crate::pool::RetrievalPool;
use crate::scrapers::article::HtmlExtractor;
use crate::scrapers::google_news::GoogleNews;
use crate::telemetry::Telemetry;
use crate::utils::{prepare_output_dir, upload_timestamp};
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument, Instrument};

/// Common capability of everything the registry can build.
pub trait Runnable {
    async fn run(&self, telemetry: &Telemetry) -> Result<(), Box<dyn Error>>;
}

type Factory = fn(&Config) -> Component;

/// Component name to constructor.
pub static REGISTRY: &[(&str, Factory)] = &[
    ("news_retrieval", news_retrieval),
    ("data_analysis", data_analysis),
];

fn news_retrieval(config: &Config) -> Component {
    Component::NewsRetrieval(NewsRetrieval {
        retrieval: config.retrieval.clone(),
        output: config.output.clone(),
    })
}

fn data_analysis(config: &Config) -> Component {
    Component::DataAnalysis(DataAnalysis {
        output_dir: config.output.dir.clone(),
        report_name: config.analysis.report_name.clone(),
    })
}

#[derive(Debug)]
pub enum Component {
    NewsRetrieval(NewsRetrieval),
    DataAnalysis(DataAnalysis),
}

impl Component {
    pub fn name(&self) -> &'static str {
        match self {
            Component::NewsRetrieval(_) => "news_retrieval",
            Component::DataAnalysis(_) => "data_analysis",
        }
    }
}

impl Runnable for Component {
    async fn run(&self, telemetry: &Telemetry) -> Result<(), Box<dyn Error>> {
        let span = telemetry.component_span(self.name());
        match self {
            Component::NewsRetrieval(c) => c.run(telemetry).instrument(span).await,
            Component::DataAnalysis(c) => c.run(telemetry).instrument(span).await,
        }
    }
}

/// Resolve configured component names, rejecting unknown ones.
pub fn build_components(names: &[String], config: &Config) -> Result<Vec<Component>, ConfigError> {
    names
        .iter()
        .map(|name| {
            REGISTRY
                .iter()
                .find(|(known, _)| known == name)
                .map(|(_, factory)| factory(config))
                .ok_or_else(|| {
                    let known = REGISTRY.iter().map(|(n, _)| *n).collect::<Vec<_>>().join(", ");
                    ConfigError::UnknownComponent(name.clone(), known)
                })
        })
        .collect()
}

/// Run components in order, stopping at the first failure.
///
/// The telemetry handle is finished whether or not a component failed.
pub async fn run_all(components: &[Component], telemetry: Telemetry) -> Result<(), Box<dyn Error>> {
    let mut outcome = Ok(());
    for component in components {
        info!(component = component.name(), "Starting component");
        if let Err(e) = component.run(&telemetry).await {
            error!(component = component.name(), error = %e, "Component failed");
            outcome = Err(e);
            break;
        }
    }

    telemetry.finish();
    outcome
}

/// Retrieval campaign over every configured country and risk category.
#[derive(Debug)]
pub struct NewsRetrieval {
    retrieval: RetrievalConfig,
    output: OutputConfig,
}

impl Runnable for NewsRetrieval {
    #[instrument(level = "info", skip_all, fields(output_dir = %self.output.dir.display()))]
    async fn run(&self, _telemetry: &Telemetry) -> Result<(), Box<dyn Error>> {
        prepare_output_dir(&self.output.dir, self.output.clear_before_run).await?;

        let r = &self.retrieval;
        let search = GoogleNews::new(&r.region, r.request_timeout())?;
        let extractor = HtmlExtractor::new(r.request_timeout())?;
        let fetcher = ArticleFetcher::with_policy(extractor, r.language.clone(), r.fetch_retries, r.retry_delay());
        let pool = RetrievalPool::new(fetcher, r.max_workers, r.min_text_length);
        let sink = JsonSegmentSink::new(&self.output.dir);

        info!(
            countries = r.countries.len(),
            categories = r.risk_categories.len(),
            max_workers = r.max_workers,
            "Starting news retrieval"
        );
        let plan = CampaignPlan::from_config(r, self.output.on_persist_failure);
        let report = Campaign::new(search, pool, sink, plan).run().await?;
        info!(?report, "News retrieval finished");
        Ok(())
    }
}

/// Markdown report over everything persisted in the output directory.
#[derive(Debug)]
pub struct DataAnalysis {
    output_dir: PathBuf,
    report_name: String,
}

impl Runnable for DataAnalysis {
    #[instrument(level = "info", skip_all, fields(output_dir = %self.output_dir.display()))]
    async fn run(&self, _telemetry: &Telemetry) -> Result<(), Box<dyn Error>> {
        let segments = load_segments(&self.output_dir).await?;
        let analysis = analyse(&segments);
        info!(
            segments = segments.len(),
            rows = analysis.total_rows,
            "Analysed persisted rows"
        );

        let md = analysis_to_markdown(&analysis, &upload_timestamp());
        let path = self.output_dir.join(&self.report_name);
        fs::write(&path, md).await?;
        info!(path = %path.display(), "Wrote analysis report");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResultRow;
    use crate::outputs::segments::tests::{row, temp_dir};
    use crate::outputs::segments::{ResultSink, WriteMode};

    const CONFIG: &str = r#"
components: [news_retrieval, data_analysis]
retrieval:
  commodity: cocoa
  countries: [Ghana]
  risk_categories: [slavery]
  start_date: 2018-06-01
  end_date: 2024-12-31
"#;

    fn config() -> Config {
        Config::from_yaml(CONFIG).unwrap()
    }

    #[test]
    fn test_build_known_components_in_order() {
        let config = config();
        let components = build_components(&config.components, &config).unwrap();
        let names: Vec<_> = components.iter().map(Component::name).collect();
        assert_eq!(names, vec!["news_retrieval", "data_analysis"]);
    }

    #[test]
    fn test_unknown_component_is_rejected() {
        let config = config();
        let err = build_components(&["web_scraping".to_string()], &config).unwrap_err();
        match err {
            ConfigError::UnknownComponent(name, known) => {
                assert_eq!(name, "web_scraping");
                assert_eq!(known, "news_retrieval, data_analysis");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_data_analysis_writes_report() {
        let dir = temp_dir("components_analysis");
        let _ = fs::remove_dir_all(&dir).await;
        let sink = JsonSegmentSink::new(&dir);
        sink.append(
            "Ghana",
            "slavery",
            &[row("Ghana", "Slavery", "u1"), row("Ghana", "Slavery", "u2")],
            &ResultRow::SCHEMA,
            WriteMode::Create,
        )
        .await
        .unwrap();

        let component = DataAnalysis {
            output_dir: dir.clone(),
            report_name: "analysis.md".into(),
        };
        component.run(&Telemetry::new(None)).await.unwrap();

        let md = fs::read_to_string(dir.join("analysis.md")).await.unwrap();
        assert!(md.contains("2 rows analysed"));
        assert!(md.contains("| Slavery Ghana cocoa | Slavery | Ghana | 2 |"));
        assert!(md.contains("| text_retrieved_is_too_small | 2 |"));

        let _ = fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_run_all_stops_at_first_failure() {
        let missing = temp_dir("components_missing");
        let _ = fs::remove_dir_all(&missing).await;
        let dir = temp_dir("components_after_failure");
        let _ = fs::remove_dir_all(&dir).await;
        fs::create_dir_all(&dir).await.unwrap();

        let components = vec![
            Component::DataAnalysis(DataAnalysis {
                output_dir: missing.clone(),
                report_name: "analysis.md".into(),
            }),
            Component::DataAnalysis(DataAnalysis {
                output_dir: dir.clone(),
                report_name: "analysis.md".into(),
            }),
        ];

        assert!(run_all(&components, Telemetry::new(None)).await.is_err());
        assert!(!dir.join("analysis.md").exists());

        let _ = fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_run_all_runs_every_component() {
        let dir = temp_dir("components_run_all");
        let _ = fs::remove_dir_all(&dir).await;
        fs::create_dir_all(&dir).await.unwrap();

        let components = vec![Component::DataAnalysis(DataAnalysis {
            output_dir: dir.clone(),
            report_name: "analysis.md".into(),
        })];

        run_all(&components, Telemetry::new(None)).await.unwrap();
        assert!(dir.join("analysis.md").exists());

        let _ = fs::remove_dir_all(&dir).await;
    }
}
