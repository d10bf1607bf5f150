//! Link entity: the canonical stored state of a link resource.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::domain::entities::TagSet;

/// Errors that can occur when parsing a [`LinkId`] from text.
#[derive(Debug, thiserror::Error)]
pub enum ParseLinkIdError {
    #[error("expected 24 hex characters, got {0}")]
    InvalidLength(usize),

    #[error("invalid hex encoding: {0}")]
    InvalidHex(String),
}

/// 12-byte link identifier, rendered as 24 lowercase hex characters.
///
/// This is the store's identifier format; a notification whose `id` does not
/// parse into it is malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkId([u8; 12]);

impl LinkId {
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }
}

impl FromStr for LinkId {
    type Err = ParseLinkIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 24 {
            return Err(ParseLinkIdError::InvalidLength(s.len()));
        }

        let mut bytes = [0u8; 12];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| ParseLinkIdError::InvalidHex(e.to_string()))?;

        Ok(Self(bytes))
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// A stored link with its scraped metadata.
///
/// Owned by the persistence layer; the worker holds a transient copy only for
/// the duration of one refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkRecord {
    pub id: LinkId,
    pub url: String,
    pub title: String,
    /// Unique, ordered by first appearance.
    pub tags: TagSet,
    pub images: Vec<String>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full-record update submitted to the repository.
///
/// Equals the original record with `title`/`tags` possibly replaced by merged
/// values; a refresh that scraped nothing new produces an update identical to
/// the stored record.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkUpdate {
    pub id: LinkId,
    pub url: String,
    pub title: String,
    pub tags: TagSet,
    pub images: Vec<String>,
    pub user_id: String,
}

impl LinkUpdate {
    /// An update that re-submits the record unchanged.
    pub fn from_record(record: &LinkRecord) -> Self {
        Self {
            id: record.id,
            url: record.url.clone(),
            title: record.title.clone(),
            tags: record.tags.clone(),
            images: record.images.clone(),
            user_id: record.user_id.clone(),
        }
    }
}
