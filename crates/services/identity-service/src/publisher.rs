//! Event publishers.

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, info};

use common::{AppError, AppResult};
use domain::DomainEvent;

use crate::ports::EventPublisher;

/// Writes every event to the log as structured JSON.
#[derive(Debug, Default, Clone)]
pub struct TracingEventPublisher;

#[async_trait]
impl EventPublisher for TracingEventPublisher {
    async fn publish(&self, events: &[DomainEvent]) -> AppResult<()> {
        for event in events {
            let payload = serde_json::to_string(event)
                .map_err(|e| AppError::internal(format!("event serialization failed: {}", e)))?;
            info!(
                event_id = %event.event_id(),
                event_type = event.event_type(),
                payload = %payload,
                "Domain event"
            );
        }
        Ok(())
    }
}

/// Fans events out to in-process subscribers.
#[derive(Debug, Clone)]
pub struct BroadcastEventPublisher {
    sender: broadcast::Sender<DomainEvent>,
}

impl BroadcastEventPublisher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl EventPublisher for BroadcastEventPublisher {
    async fn publish(&self, events: &[DomainEvent]) -> AppResult<()> {
        for event in events {
            // Err only means nobody is listening.
            if self.sender.send(event.clone()).is_err() {
                debug!(event_type = event.event_type(), "No subscribers for event");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Email, Username};
    use uuid::Uuid;

    fn created() -> DomainEvent {
        DomainEvent::user_created(
            Some(Uuid::new_v4()),
            Email::parse("alice@example.com").unwrap(),
            Username::parse("alice123").unwrap(),
            "Alice".to_string(),
            "Smith".to_string(),
        )
    }

    #[tokio::test]
    async fn test_broadcast_delivers_in_order() {
        let publisher = BroadcastEventPublisher::new(8);
        let mut rx = publisher.subscribe();
        let first = created();
        let second = created();

        publisher
            .publish(&[first.clone(), second.clone()])
            .await
            .unwrap();

        assert_eq!(rx.recv().await.unwrap(), first);
        assert_eq!(rx.recv().await.unwrap(), second);
    }

    #[tokio::test]
    async fn test_broadcast_without_subscribers_is_ok() {
        let publisher = BroadcastEventPublisher::new(8);
        assert!(publisher.publish(&[created()]).await.is_ok());
    }

    #[tokio::test]
    async fn test_tracing_publisher_accepts_events() {
        assert!(TracingEventPublisher.publish(&[created()]).await.is_ok());
    }
}
