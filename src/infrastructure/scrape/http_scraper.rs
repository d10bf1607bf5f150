//! HTTP implementation of the scraper seam.

use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};
use url::Url;

use crate::domain::scraper::{ScrapeResult, Scraper};
use crate::error::AppError;

const USER_AGENT: &str = concat!("link-refresher/", env!("CARGO_PKG_VERSION"));

/// Fetches pages over HTTP and extracts `<title>` text and
/// `meta[name=keywords]` tags.
pub struct HttpScraper {
    client: reqwest::Client,
}

impl HttpScraper {
    /// Creates a scraper with the given per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Scrape`] if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::scrape("", format!("http client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Scraper for HttpScraper {
    async fn parse(&self, url: &str) -> Result<ScrapeResult, AppError> {
        // Reject non-HTTP(S) URLs before issuing a request.
        let parsed = Url::parse(url).map_err(|e| AppError::scrape(url, e.to_string()))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(AppError::scrape(url, "unsupported scheme"));
        }

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| AppError::scrape(url, e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::scrape(
                url,
                format!("status {}", response.status()),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::scrape(url, e.to_string()))?;

        Ok(extract(&body))
    }
}

/// Extracts title and keyword tags from an HTML body.
///
/// Never fails: a page without a `<title>` or keywords meta yields empty
/// fields, which the merge treats as "nothing new".
fn extract(body: &str) -> ScrapeResult {
    let document = Html::parse_document(body);

    let title_selector = Selector::parse("title").unwrap();
    let keywords_selector = Selector::parse(r#"meta[name="keywords"]"#).unwrap();

    let title = document
        .select(&title_selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let tags = document
        .select(&keywords_selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|content| {
            content
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    ScrapeResult { title, tags }
}
