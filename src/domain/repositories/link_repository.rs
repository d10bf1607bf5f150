//! Repository trait for link data access.

use async_trait::async_trait;

use crate::domain::entities::{LinkId, LinkRecord, LinkUpdate};
use crate::error::AppError;

/// Repository interface for stored links.
///
/// The worker only reads single records and writes back full-record updates;
/// everything else about the store stays behind this seam.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Finds a link by its identifier.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(LinkRecord))` if found
    /// - `Ok(None)` if not found
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persist`] on storage errors.
    async fn find_by_id(&self, id: LinkId) -> Result<Option<LinkRecord>, AppError>;

    /// Overwrites a link with the given update and returns the stored record.
    ///
    /// The write is a full-record overwrite; submitting an update equal to the
    /// stored record is a valid no-op.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record matches the update's id.
    /// Returns [`AppError::Persist`] on storage errors.
    async fn update(&self, update: LinkUpdate) -> Result<LinkRecord, AppError>;
}
