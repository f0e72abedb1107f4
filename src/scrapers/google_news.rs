//! Google News RSS search.
//!
//! Queries `https://news.google.com/rss/search` and maps each `<item>` of the
//! returned feed to a [`Candidate`]. The date range is expressed with the
//! `after:` and `before:` search operators appended to the query.
//!
//! # Feed Shape
//!
//! ```text
//! <item>
//!   <title>Headline - Publisher</title>
//!   <link>https://news.google.com/rss/articles/...</link>
//!   <pubDate>Mon, 01 Jan 2024 08:00:00 GMT</pubDate>
//!   <source url="https://www.publisher.com">Publisher</source>
//! </item>
//! ```

use super::{NewsSearch, SearchParams};
use crate::error::SearchError;
use crate::models::{Candidate, RawPublisher};
use crate::utils::truncate_for_log;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

const GOOGLE_NEWS_RSS: &str = "https://news.google.com/rss/search";

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    source: Option<RssSource>,
}

#[derive(Debug, Deserialize)]
struct RssSource {
    #[serde(rename = "@url")]
    url: Option<String>,
    #[serde(rename = "$text")]
    title: Option<String>,
}

/// Search collaborator backed by the Google News RSS endpoint.
#[derive(Debug, Clone)]
pub struct GoogleNews {
    client: Client,
    /// Two-letter region code used for `gl` and `ceid`, e.g. `US`.
    region: String,
}

impl GoogleNews {
    pub fn new(region: &str, timeout: Duration) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::Network(e.to_string()))?;
        Ok(Self {
            client,
            region: region.to_uppercase(),
        })
    }

    fn request_url(&self, query: &str, params: &SearchParams) -> String {
        let q = format!(
            "{} after:{} before:{}",
            query,
            params.start_date.format("%Y-%m-%d"),
            params.end_date.format("%Y-%m-%d")
        );
        format!(
            "{}?q={}&hl={}&gl={}&ceid={}:{}",
            GOOGLE_NEWS_RSS,
            urlencoding::encode(&q),
            params.language,
            self.region,
            self.region,
            params.language
        )
    }
}

impl NewsSearch for GoogleNews {
    #[instrument(level = "info", skip_all, fields(%query))]
    async fn search(&self, query: &str, params: &SearchParams) -> Result<Vec<Candidate>, SearchError> {
        let t0 = Instant::now();
        let url = self.request_url(query, params);
        debug!(%url, "Requesting Google News feed");

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                message: truncate_for_log(&message, 300),
            });
        }
        let body = resp.text().await?;

        let candidates = parse_feed(&body, query, params.max_results)?;
        info!(
            count = candidates.len(),
            elapsed_ms = t0.elapsed().as_millis(),
            "Indexed Google News results"
        );
        Ok(candidates)
    }
}

/// Map an RSS document to candidates, keeping at most `max_results` items.
///
/// Items without a link are skipped.
fn parse_feed(xml: &str, prompt: &str, max_results: usize) -> Result<Vec<Candidate>, SearchError> {
    let rss: Rss = quick_xml::de::from_str(xml).map_err(|e| SearchError::Malformed(e.to_string()))?;

    let candidates = rss
        .channel
        .items
        .into_iter()
        .filter_map(|item| {
            let Some(url) = item.link.filter(|l| !l.trim().is_empty()) else {
                warn!(title = ?item.title, "Feed item without link; skipping");
                return None;
            };
            Some(Candidate {
                url: url.trim().to_string(),
                title: item.title.unwrap_or_default(),
                published_date: item.pub_date.unwrap_or_default(),
                publisher: item.source.map(publisher_record),
                prompt: prompt.to_string(),
            })
        })
        .take(max_results)
        .collect();

    Ok(candidates)
}

fn publisher_record(source: RssSource) -> RawPublisher {
    let mut record = Map::new();
    if let Some(href) = source.url {
        record.insert("href".into(), Value::String(href));
    }
    if let Some(title) = source.title {
        record.insert("title".into(), Value::String(title));
    }
    RawPublisher::Record(record)
}
