pub mod event;
pub mod kafka_consumer;
