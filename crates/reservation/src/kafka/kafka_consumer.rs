use crate::{domain::event::OrderEvent, kafka::event::OrderEventHandler};
use anyhow::{Context, Result};
use rdkafka::{
    Message,
    config::ClientConfig,
    consumer::{Consumer, StreamConsumer},
    message::BorrowedMessage,
};
use std::sync::Arc;
use tokio::{
    sync::broadcast,
    time::{Duration, sleep},
};
use tracing::{debug, error, info, warn};

pub struct KafkaEventConsumer {
    consumer: StreamConsumer,
    handler: Arc<OrderEventHandler>,
}

/// Decodes a message payload. `None` for empty or malformed payloads, which
/// are logged and skipped.
pub fn decode_event(topic: &str, payload: Option<&[u8]>) -> Option<OrderEvent> {
    let Some(payload) = payload.filter(|p| !p.is_empty()) else {
        error!(topic, "Empty message payload");
        return None;
    };

    match serde_json::from_slice::<OrderEvent>(payload) {
        Ok(event) => {
            debug!(topic, event = ?event, "Event deserialized successfully");
            Some(event)
        }
        Err(e) => {
            error!(topic, "Failed to deserialize event: {e}");
            None
        }
    }
}

impl KafkaEventConsumer {
    pub fn new(brokers: &str, group_id: &str, handler: Arc<OrderEventHandler>) -> Result<Self> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("group.id", group_id)
            .set("enable.partition.eof", "false")
            .set("session.timeout.ms", "6000")
            .set("enable.auto.commit", "true")
            .set("auto.offset.reset", "latest")
            .create()
            .context("Failed to create Kafka consumer")?;

        Ok(Self { consumer, handler })
    }

    async fn process(&self, message: &BorrowedMessage<'_>) {
        let topic = message.topic();

        let key = message
            .key()
            .and_then(|k| std::str::from_utf8(k).ok())
            .map(str::to_owned);

        let Some(event) = decode_event(topic, message.payload()) else {
            return;
        };

        if let Some(key_id) = key.as_deref().and_then(|k| k.parse::<i32>().ok())
            && key_id != event.order_id()
        {
            warn!(
                topic,
                key_id,
                event_order_id = event.order_id(),
                "Key ID does not match event order_id"
            );
        }

        match self.handler.handle_event(event).await {
            Ok(()) => info!(topic, key = ?key, "✅ Event processed successfully"),
            Err(e) => error!(topic, key = ?key, "Failed to handle event: {e}"),
        }
    }

    pub async fn start_with_shutdown(self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        self.consumer
            .subscribe(&OrderEvent::TOPICS)
            .context("Failed to subscribe to order topics")?;

        info!("✅ Kafka consumer subscribed to {:?}", OrderEvent::TOPICS);

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("🛑 Kafka consumer received shutdown signal");
                    break;
                }
                message = self.consumer.recv() => match message {
                    Ok(message) => self.process(&message).await,
                    Err(e) => {
                        error!("Kafka receive error: {e}");
                        sleep(Duration::from_secs(5)).await;
                    }
                }
            }
        }

        info!("✅ Kafka consumer stopped gracefully");
        Ok(())
    }
}

/// Keeps a consumer running until shutdown, recreating it after failures.
pub async fn run_kafka_consumer(
    brokers: String,
    handler: Arc<OrderEventHandler>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    loop {
        info!("🔄 Starting Kafka consumer...");

        let result =
            match KafkaEventConsumer::new(&brokers, "reservation-service-group", handler.clone()) {
                Ok(consumer) => consumer.start_with_shutdown(shutdown_rx.resubscribe()).await,
                Err(e) => Err(e),
            };

        match result {
            Ok(()) => break,
            Err(e) => error!("💀 Kafka consumer error: {e:#}. Restarting in 5s..."),
        }

        tokio::select! {
            _ = sleep(Duration::from_secs(5)) => {}
            _ = shutdown_rx.recv() => break,
        }
    }
}
