//! Delivery-channel abstraction: a producer of delivery handles, decoupled
//! from any specific broker transport.

use async_trait::async_trait;

use crate::error::AppError;

/// How a processed delivery is resolved with the broker.
///
/// The policy is fixed: success acknowledges, any failure rejects without
/// requeue. There is no retry or dead-letter path; a rejected message is
/// permanently dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Acknowledge,
    Reject,
}

/// One unit of message transport, requiring exactly one resolution.
#[async_trait]
pub trait Delivery: Send {
    /// The raw message payload.
    fn payload(&self) -> &[u8];

    /// Resolves the delivery with the broker, consuming it.
    ///
    /// Both cases are single-message (not cumulative); `Reject` never
    /// requeues.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Resolve`] when the broker refuses the resolution.
    async fn resolve(self: Box<Self>, resolution: Resolution) -> Result<(), AppError>;
}

/// An open subscription yielding deliveries in receipt order.
#[async_trait]
pub trait DeliveryStream: Send {
    /// Awaits the next delivery; `None` when the broker closed the stream.
    async fn next(&mut self) -> Option<Box<dyn Delivery>>;
}

/// Broker-side entry point: establishes a subscription on a queue.
#[async_trait]
pub trait MessageConsumer: Send + Sync {
    /// Subscribes to `queue` with manual acknowledgments, non-exclusive.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Subscribe`] when the subscription cannot be
    /// established; no partial subscription state is left behind.
    async fn subscribe(&self, queue: &str) -> Result<Box<dyn DeliveryStream>, AppError>;
}
