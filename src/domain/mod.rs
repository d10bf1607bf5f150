//! Domain layer containing business entities and collaborator seams.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures and the tag merge rule
//! - [`repositories`] - Data access trait definitions
//! - [`scraper`] - Page-metadata extraction seam
//! - [`messaging`] - Delivery-channel abstraction (subscribe / deliver / resolve)
//!
//! The domain layer has no dependencies on infrastructure; repository,
//! scraper, and messaging traits define contracts implemented by
//! [`crate::infrastructure`].

pub mod entities;
pub mod messaging;
pub mod repositories;
pub mod scraper;
