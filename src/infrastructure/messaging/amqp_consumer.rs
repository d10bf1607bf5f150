//! AMQP (RabbitMQ) implementation of the delivery channel.

use async_trait::async_trait;
use futures_util::StreamExt;
use lapin::message::Delivery as LapinDelivery;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicNackOptions, QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{Channel, Connection, ConnectionProperties};
use tracing::warn;

use crate::domain::messaging::{Delivery, DeliveryStream, MessageConsumer, Resolution};
use crate::error::AppError;

/// `lapin`-backed message consumer.
///
/// Holds one channel on one connection. Reconnection is out of scope: if the
/// connection drops, the delivery stream ends and the consumer loop stops.
pub struct AmqpConsumer {
    channel: Channel,
}

impl AmqpConsumer {
    /// Connects to the broker and opens a channel.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Subscribe`] if the connection or channel cannot be
    /// established.
    pub async fn connect(uri: &str) -> Result<Self, AppError> {
        let connection = Connection::connect(uri, ConnectionProperties::default())
            .await
            .map_err(|e| AppError::subscribe(format!("amqp connect: {e}")))?;

        let channel = connection
            .create_channel()
            .await
            .map_err(|e| AppError::subscribe(format!("amqp channel: {e}")))?;

        Ok(Self { channel })
    }
}

#[async_trait]
impl MessageConsumer for AmqpConsumer {
    async fn subscribe(&self, queue: &str) -> Result<Box<dyn DeliveryStream>, AppError> {
        self.channel
            .queue_declare(queue, QueueDeclareOptions::default(), FieldTable::default())
            .await
            .map_err(|e| AppError::subscribe(format!("queue declare {queue}: {e}")))?;

        // Manual acks, non-exclusive, empty consumer tag.
        let consumer = self
            .channel
            .basic_consume(
                queue,
                "",
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| AppError::subscribe(format!("basic consume {queue}: {e}")))?;

        Ok(Box::new(AmqpDeliveryStream { consumer }))
    }
}

struct AmqpDeliveryStream {
    consumer: lapin::Consumer,
}

#[async_trait]
impl DeliveryStream for AmqpDeliveryStream {
    async fn next(&mut self) -> Option<Box<dyn Delivery>> {
        match self.consumer.next().await? {
            Ok(delivery) => Some(Box::new(AmqpDelivery { inner: delivery })),
            Err(err) => {
                // Stream-level errors mean the channel is gone.
                warn!(error = %err, "amqp consumer stream error");
                None
            }
        }
    }
}

struct AmqpDelivery {
    inner: LapinDelivery,
}

#[async_trait]
impl Delivery for AmqpDelivery {
    fn payload(&self) -> &[u8] {
        &self.inner.data
    }

    async fn resolve(self: Box<Self>, resolution: Resolution) -> Result<(), AppError> {
        let result = match resolution {
            Resolution::Acknowledge => {
                self.inner
                    .acker
                    .ack(BasicAckOptions { multiple: false })
                    .await
            }
            Resolution::Reject => {
                self.inner
                    .acker
                    .nack(BasicNackOptions {
                        multiple: false,
                        requeue: false,
                    })
                    .await
            }
        };

        result.map_err(|e| AppError::resolve(e.to_string()))
    }
}
