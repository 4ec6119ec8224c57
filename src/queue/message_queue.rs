use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam::queue::SegQueue;

use super::message::Message;

/// One named FIFO. Push and pop are each atomic, so concurrent callers never
/// observe a half-applied mutation and no message is popped twice.
pub struct MessageQueue {
    name: String,
    queue: SegQueue<Message>,
    stats: QueueStats,
}

#[derive(Debug, Default)]
pub struct QueueStats {
    enqueued_total: AtomicU64,
    dequeued_total: AtomicU64,
}

impl QueueStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueued_total(&self) -> u64 {
        self.enqueued_total.load(Ordering::SeqCst)
    }

    pub fn dequeued_total(&self) -> u64 {
        self.dequeued_total.load(Ordering::SeqCst)
    }
}

impl MessageQueue {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            queue: SegQueue::new(),
            stats: QueueStats::new(),
        }
    }

    pub fn push(&self, message: Message) {
        self.queue.push(message);
        self.stats.enqueued_total.fetch_add(1, Ordering::SeqCst);
    }

    pub fn pop(&self) -> Option<Message> {
        let message = self.queue.pop()?;
        self.stats.dequeued_total.fetch_add(1, Ordering::SeqCst);
        Some(message)
    }

    pub fn size(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stats(&self) -> &QueueStats {
        &self.stats
    }
}
