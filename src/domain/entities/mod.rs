//! Core domain data structures.

pub mod link;
pub mod notification;
pub mod tags;

pub use link::{LinkId, LinkRecord, LinkUpdate, ParseLinkIdError};
pub use notification::LinkNotification;
pub use tags::{unique_tags, TagSet};
