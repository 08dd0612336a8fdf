use crate::models::events::Notification;

/// Outbound side of the application event bus.
pub trait EventBus {
    fn publish(&mut self, notification: Notification);
}

impl<F> EventBus for F
where
    F: FnMut(Notification),
{
    fn publish(&mut self, notification: Notification) {
        self(notification)
    }
}
