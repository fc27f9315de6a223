//! Order lifecycle sinks.

use tokio::sync::broadcast;
use tracing::info;

use crate::domain::Order;

/// Told about every successful order transition.
///
/// Fire-and-forget: implementations swallow their own failures so a transition
/// never fails because of the observer.
pub trait LifecycleObserver: Send + Sync {
    fn order_status_changed(&self, order: &Order);
}

/// Writes each transition to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingObserver;

impl LifecycleObserver for LoggingObserver {
    fn order_status_changed(&self, order: &Order) {
        info!(
            order_id = %order.id,
            status = %order.status,
            history_len = order.history.len(),
            "Order status changed"
        );
    }
}

/// Publishes order snapshots on a tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct BroadcastObserver {
    sender: broadcast::Sender<Order>,
}

impl BroadcastObserver {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Order> {
        self.sender.subscribe()
    }
}

impl LifecycleObserver for BroadcastObserver {
    fn order_status_changed(&self, order: &Order) {
        LoggingObserver.order_status_changed(order);
        // No subscribers is not an error for the transition.
        let _ = self.sender.send(order.clone());
    }
}
