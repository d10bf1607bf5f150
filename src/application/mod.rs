//! Application layer: service orchestration and the consumer loop.
//!
//! - [`services`] - Refresh orchestration over the domain seams
//! - [`consumer`] - Queue consumption, dispatch, and delivery resolution

pub mod consumer;
pub mod services;

pub use consumer::ConsumerLoop;
