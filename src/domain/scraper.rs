//! Scraper trait: the page-metadata extraction seam.

use async_trait::async_trait;

use crate::error::AppError;

/// Metadata extracted from one page fetch.
///
/// Transient; produced per refresh and consumed immediately. Both fields may
/// legitimately be empty — a page without a title or keywords is not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeResult {
    pub title: String,
    pub tags: Vec<String>,
}

/// Interface for fetching a page and extracting its metadata.
///
/// # Implementations
///
/// - [`crate::infrastructure::scrape::HttpScraper`] - HTTP implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Scraper: Send + Sync {
    /// Fetches `url` and extracts its title and tags.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Scrape`] when the page cannot be fetched.
    async fn parse(&self, url: &str) -> Result<ScrapeResult, AppError>;
}
