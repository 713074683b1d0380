//! Event Bus - broadcast of completed actions
//!
//! Observers subscribe; the application emits after each action. Emitting
//! with no subscribers drops the event.

use tokio::sync::broadcast;
use tracing::debug;

use super::types::ActionEvent;

/// Default channel capacity (events)
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1_024;

pub struct EventBus {
    tx: broadcast::Sender<ActionEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        debug!(capacity, "EventBus::new: creating event bus");
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Emit an event to all subscribers
    ///
    /// When the channel is full, the oldest events are dropped for lagging
    /// receivers.
    pub fn emit(&self, event: ActionEvent) {
        debug!(
            event_type = event.event_type(),
            progression_id = event.progression_id(),
            "EventBus::emit"
        );
        // No subscribers is fine
        let _ = self.tx.send(event);
    }

    /// Receive every event emitted after this call
    pub fn subscribe(&self) -> broadcast::Receiver<ActionEvent> {
        debug!("EventBus::subscribe: new subscriber");
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    fn created(id: &str) -> ActionEvent {
        ActionEvent::ProgressionCreated {
            progression_id: id.to_string(),
            name: "Test".to_string(),
        }
    }

    #[test]
    fn test_subscribe_counts() {
        let bus = EventBus::new(16);
        assert_eq!(bus.subscriber_count(), 0);
        let _rx1 = bus.subscribe();
        let _rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[test]
    fn test_emit_without_subscribers() {
        let bus = EventBus::default();
        bus.emit(created("p1"));
    }

    #[tokio::test]
    async fn test_all_subscribers_receive() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.emit(created("p1"));

        assert_eq!(rx1.recv().await.unwrap().progression_id(), "p1");
        assert_eq!(rx2.recv().await.unwrap().event_type(), "ProgressionCreated");
        assert!(matches!(rx1.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_events_before_subscribe_are_missed() {
        let bus = EventBus::new(16);
        bus.emit(created("early"));
        let mut rx = bus.subscribe();
        bus.emit(created("late"));
        assert_eq!(rx.recv().await.unwrap().progression_id(), "late");
    }
}
