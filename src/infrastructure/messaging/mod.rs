pub mod amqp_consumer;

pub use amqp_consumer::AmqpConsumer;
