//! Link refresh service: fetch, scrape, merge, persist.

use std::sync::Arc;

use crate::domain::entities::{unique_tags, LinkNotification, LinkRecord, LinkUpdate};
use crate::domain::repositories::LinkRepository;
use crate::domain::scraper::{ScrapeResult, Scraper};
use crate::error::AppError;

/// Service that refreshes one link's metadata per notification.
///
/// # Merge Rules
///
/// - A non-empty scraped title replaces the stored title; an empty one leaves
///   it unchanged.
/// - Tags are merged as `unique_tags([stored, scraped])`: stored tags keep
///   their positions, new scraped tags append in first-seen order.
/// - The merged record is written back unconditionally, even when the merge
///   changed nothing. Re-delivery of the same notification re-submits an
///   identical update.
pub struct RefreshService<R: LinkRepository, S: Scraper> {
    repository: Arc<R>,
    scraper: Arc<S>,
}

impl<R: LinkRepository, S: Scraper> RefreshService<R, S> {
    /// Creates a new refresh service.
    pub fn new(repository: Arc<R>, scraper: Arc<S>) -> Self {
        Self {
            repository,
            scraper,
        }
    }

    /// Refreshes the link named by `notification` and returns the stored
    /// record after the write.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record matches the identifier,
    /// [`AppError::Scrape`] if the page fetch fails, and [`AppError::Persist`]
    /// if the write fails. An empty scrape result is not an error.
    pub async fn refresh(&self, notification: &LinkNotification) -> Result<LinkRecord, AppError> {
        let record = self
            .repository
            .find_by_id(notification.id)
            .await?
            .ok_or_else(|| AppError::not_found(notification.id))?;

        let scraped = self.scraper.parse(&record.url).await?;

        let update = merge(&record, scraped);

        self.repository.update(update).await
    }
}

/// Combines the stored record with freshly scraped metadata.
fn merge(record: &LinkRecord, scraped: ScrapeResult) -> LinkUpdate {
    let mut update = LinkUpdate::from_record(record);

    if !scraped.title.is_empty() {
        update.title = scraped.title;
    }

    update.tags = unique_tags([record.tags.as_slice(), scraped.tags.as_slice()]);

    update
}
