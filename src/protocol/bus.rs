//! Best-effort broadcast to whichever UI contexts are alive

use tokio::sync::broadcast;
use tracing::debug;

use super::messages::Event;

const EVENT_CHANNEL_CAPACITY: usize = 100;

#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Publish `event` to current subscribers.
    ///
    /// Having no subscriber is the normal case when no popup is open, so
    /// this never fails.
    pub fn publish(&self, event: Event) {
        let name = event.name();
        match self.tx.send(event) {
            Ok(receivers) => debug!("Published {} to {} listeners", name, receivers),
            Err(_) => debug!("No listeners for {}", name),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_listeners() {
        let bus = EventBus::new();
        bus.publish(Event::Notification {
            title: "t".to_string(),
            message: "m".to_string(),
        });
    }

    #[test]
    fn test_late_subscriber_sees_only_new_events() {
        let bus = EventBus::new();
        bus.publish(Event::Notification { title: "early".into(), message: String::new() });

        let mut rx = bus.subscribe();
        bus.publish(Event::Notification { title: "late".into(), message: String::new() });

        match rx.try_recv().unwrap() {
            Event::Notification { title, .. } => assert_eq!(title, "late"),
            other => panic!("unexpected event {:?}", other),
        }
        assert!(rx.try_recv().is_err());
    }
}
