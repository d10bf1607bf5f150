//! Error taxonomy for the refresh worker.
//!
//! Every failure while processing a single delivery is caught at the consumer
//! loop boundary and turns into a reject; only [`AppError::Subscribe`] escapes
//! to the caller, from the loop's startup.

use crate::domain::entities::LinkId;

/// Worker error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The message payload is malformed or its identifier cannot be parsed.
    #[error("malformed notification: {reason}")]
    Decode { reason: String },

    /// No stored record matches the notification identifier.
    #[error("link {id} not found")]
    NotFound { id: LinkId },

    /// The page could not be fetched or its metadata extracted.
    #[error("scrape failed for {url}: {reason}")]
    Scrape { url: String, reason: String },

    /// The merged record could not be written back.
    #[error("persist failed: {reason}")]
    Persist { reason: String },

    /// The broker subscription could not be established.
    #[error("subscription failed: {reason}")]
    Subscribe { reason: String },

    /// A delivery could not be acknowledged or rejected.
    #[error("delivery resolution failed: {reason}")]
    Resolve { reason: String },
}

impl AppError {
    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }

    pub fn not_found(id: LinkId) -> Self {
        Self::NotFound { id }
    }

    pub fn scrape(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Scrape {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn persist(reason: impl Into<String>) -> Self {
        Self::Persist {
            reason: reason.into(),
        }
    }

    pub fn subscribe(reason: impl Into<String>) -> Self {
        Self::Subscribe {
            reason: reason.into(),
        }
    }

    pub fn resolve(reason: impl Into<String>) -> Self {
        Self::Resolve {
            reason: reason.into(),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::persist(e.to_string())
    }
}
