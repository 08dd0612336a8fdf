use crate::models::events::Notification;
use crate::traits::EventBus;

/// Bus that keeps everything published, in order. Useful for embedding the
/// controller in a loop that forwards notifications later, and in tests.
#[derive(Debug, Default)]
pub struct MemoryBus {
    published: Vec<Notification>,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self {
            published: Vec::new(),
        }
    }

    pub fn published(&self) -> &[Notification] {
        &self.published
    }

    /// Published notifications on `topic`, oldest first.
    pub fn on_topic<'a>(&'a self, topic: &'a str) -> impl Iterator<Item = &'a Notification> + 'a {
        self.published.iter().filter(move |n| n.topic() == topic)
    }

    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.published)
    }
}

impl EventBus for MemoryBus {
    fn publish(&mut self, notification: Notification) {
        self.published.push(notification);
    }
}
