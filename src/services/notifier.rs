//! User-facing alerts

use tracing::info;

use crate::protocol::{Event, EventBus};

/// Fire a titled alert. Best-effort: implementations must not fail.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, message: &str);
}

/// Logs the alert and hands it to the host as a `NOTIFICATION` broadcast
#[derive(Debug, Clone)]
pub struct BusNotifier {
    bus: EventBus,
}

impl BusNotifier {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }
}

impl Notifier for BusNotifier {
    fn notify(&self, title: &str, message: &str) {
        info!("Notification: {} - {}", title, message);
        self.bus.publish(Event::Notification {
            title: title.to_string(),
            message: message.to_string(),
        });
    }
}
