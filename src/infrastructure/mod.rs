//! Infrastructure layer: concrete collaborator implementations.
//!
//! - [`messaging`] - AMQP delivery channel (`lapin`)
//! - [`persistence`] - PostgreSQL link repository (`sqlx`)
//! - [`scrape`] - HTTP page scraper (`reqwest` + `scraper`)

pub mod messaging;
pub mod persistence;
pub mod scrape;
