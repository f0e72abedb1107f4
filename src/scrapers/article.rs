//! Article text extraction over HTTP.
//!
//! Downloads a page with a shared [`reqwest::Client`] (per-call timeout) and
//! extracts readable text from paragraph elements. Paragraphs inside
//! `<article>` are preferred; pages without an `<article>` element fall back
//! to every `<p>` in the document.

use crate::error::ExtractError;
use crate::fetcher::Extractor;
use once_cell::sync::Lazy;
use reqwest::Client;
use reqwest::header::ACCEPT_LANGUAGE;
use scraper::{Html, Selector};
use std::time::{Duration, Instant};
use tracing::{debug, instrument};
use url::Url;

static ARTICLE_PARAGRAPHS: Lazy<Selector> = Lazy::new(|| Selector::parse("article p").unwrap());
static ALL_PARAGRAPHS: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

/// Extraction collaborator that reads article paragraphs from HTML pages.
///
/// The inner client is safe for concurrent use, so one instance is shared by
/// every worker of the retrieval pool.
#[derive(Debug, Clone)]
pub struct HtmlExtractor {
    client: Client,
}

impl HtmlExtractor {
    pub fn new(timeout: Duration) -> Result<Self, ExtractError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("risk_news_scout/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl Extractor for HtmlExtractor {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn extract(&self, url: &str, language: &str) -> Result<String, ExtractError> {
        let parsed = Url::parse(url).map_err(|e| ExtractError::Download(format!("invalid url: {e}")))?;
        let t0 = Instant::now();

        let resp = self
            .client
            .get(parsed)
            .header(ACCEPT_LANGUAGE, language)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ExtractError::Download(format!("HTTP status {}", status.as_u16())));
        }
        let body = resp.text().await?;

        let text = extract_paragraphs(&body);
        debug!(
            bytes = text.len(),
            elapsed_ms = t0.elapsed().as_millis(),
            "Parsed article"
        );
        if text.trim().is_empty() {
            return Err(ExtractError::Parse("no article text found".into()));
        }
        Ok(text)
    }
}

/// Join the text of every article paragraph, one paragraph per line.
fn extract_paragraphs(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut paragraphs: Vec<String> = document
        .select(&ARTICLE_PARAGRAPHS)
        .map(|p| paragraph_text(&p))
        .filter(|t| !t.is_empty())
        .collect();

    if paragraphs.is_empty() {
        paragraphs = document
            .select(&ALL_PARAGRAPHS)
            .map(|p| paragraph_text(&p))
            .filter(|t| !t.is_empty())
            .collect();
    }
    paragraphs.join("\n")
}

fn paragraph_text(element: &scraper::ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_article_paragraphs() {
        let html = r#"
            <html><body>
              <nav><p>Subscribe now</p></nav>
              <article>
                <h1>Headline</h1>
                <p>First   paragraph
                   continues.</p>
                <p><a href="/x">Linked</a> second paragraph.</p>
                <p>   </p>
              </article>
              <footer><p>Copyright</p></footer>
            </body></html>"#;
        assert_eq!(
            extract_paragraphs(html),
            "First paragraph continues.\nLinked second paragraph."
        );
    }

    #[test]
    fn test_falls_back_to_all_paragraphs() {
        let html = "<html><body><div><p>One.</p><p>Two.</p></div></body></html>";
        assert_eq!(extract_paragraphs(html), "One.\nTwo.");
    }

    #[test]
    fn test_no_paragraphs_is_empty() {
        assert_eq!(extract_paragraphs("<html><body><div>bare</div></body></html>"), "");
    }

    #[tokio::test]
    async fn test_invalid_url_is_download_error() {
        let extractor = HtmlExtractor::new(Duration::from_secs(1)).unwrap();
        let err = extractor.extract("not a url", "en").await.unwrap_err();
        assert!(matches!(err, ExtractError::Download(_)));
    }
}
