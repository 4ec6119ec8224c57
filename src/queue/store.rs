use std::sync::Arc;

use dashmap::DashMap;

use super::message::Message;
use super::message_queue::MessageQueue;

/// Name to queue mapping. Queues are created on first append and never removed.
///
/// The map itself is sharded behind `DashMap`'s locks and every queue serialises its
/// own pushes and pops, so no two mutations of the same queue ever interleave.
#[derive(Default)]
pub struct QueueStore {
    queues: DashMap<String, Arc<MessageQueue>>,
}

impl QueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the tail of `name`, creating the queue if needed. Never fails.
    pub fn append(&self, name: &str, payload: impl Into<String>) {
        let message = Message::new(payload);
        if let Some(queue) = self.queues.get(name) {
            queue.push(message);
            return;
        }
        self.queues
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MessageQueue::new(name)))
            .push(message);
    }

    /// Remove the head of `name`. Absent and empty queues both yield `None`.
    pub fn pop_front(&self, name: &str) -> Option<Message> {
        self.queues.get(name)?.pop()
    }

    pub fn len(&self, name: &str) -> usize {
        self.queues.get(name).map_or(0, |queue| queue.size())
    }

    pub fn queue_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.queues.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn queue_count(&self) -> usize {
        self.queues.len()
    }

    /// Snapshot of every queue handle, sorted by name.
    pub fn queues(&self) -> Vec<Arc<MessageQueue>> {
        let mut queues: Vec<Arc<MessageQueue>> =
            self.queues.iter().map(|e| Arc::clone(e.value())).collect();
        queues.sort_by(|a, b| a.name().cmp(b.name()));
        queues
    }
}
