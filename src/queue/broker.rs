use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

use super::message::Message;
use super::store::QueueStore;
use super::waiters::{deadline_after, WaitCoordinator, WakeReason};

/// The broker: lazily created named FIFOs with bounded blocking dequeue.
///
/// Enqueue never suspends. Dequeue takes the fast path when data is present and
/// otherwise parks on the [`WaitCoordinator`] until a delivery, its deadline or shutdown.
#[derive(Default)]
pub struct Broker {
    store: QueueStore,
    waiters: WaitCoordinator,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsSummary {
    pub total_queues: usize,
    pub queues: BTreeMap<String, QueueStatsInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueueStatsInfo {
    pub size: usize,
    pub enqueued_total: u64,
    pub dequeued_total: u64,
    pub waiting: usize,
}

impl Broker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, name: &str, payload: impl Into<String>) {
        self.store.append(name, payload);
        self.waiters.notify_one(name);
    }

    /// Removes the oldest message of `name`, waiting up to `timeout` for one to arrive.
    ///
    /// A zero timeout is a non-blocking poll. `None` means nothing became available
    /// before the deadline or the broker is shutting down.
    pub async fn dequeue(&self, name: &str, timeout: Duration) -> Option<Message> {
        if let Some(message) = self.store.pop_front(name) {
            return Some(message);
        }
        if timeout.is_zero() {
            return None;
        }

        let deadline = deadline_after(timeout);
        loop {
            let waiter = self.waiters.register(name);

            // An append may have landed between the failed pop and registering.
            if let Some(message) = self.store.pop_front(name) {
                drop(waiter);
                return Some(message);
            }

            match waiter.wait_until(deadline).await {
                WakeReason::Delivered => {
                    if let Some(message) = self.store.pop_front(name) {
                        return Some(message);
                    }
                    tracing::debug!(queue = name, "woken but another consumer won the race");
                }
                WakeReason::TimedOut => return None,
                WakeReason::ShuttingDown => {
                    tracing::debug!(queue = name, "dequeue released by shutdown");
                    return None;
                }
            }
        }
    }

    /// Current number of messages in `name`; 0 for queues that were never created.
    pub fn len(&self, name: &str) -> usize {
        self.store.len(name)
    }

    pub fn queue_names(&self) -> Vec<String> {
        self.store.queue_names()
    }

    pub fn queue_count(&self) -> usize {
        self.store.queue_count()
    }

    pub fn waiting_count(&self, name: &str) -> usize {
        self.waiters.waiting_count(name)
    }

    pub fn stats(&self) -> StatsSummary {
        let queues = self
            .store
            .queues()
            .into_iter()
            .map(|queue| {
                let info = QueueStatsInfo {
                    size: queue.size(),
                    enqueued_total: queue.stats().enqueued_total(),
                    dequeued_total: queue.stats().dequeued_total(),
                    waiting: self.waiters.waiting_count(queue.name()),
                };
                (queue.name().to_string(), info)
            })
            .collect::<BTreeMap<_, _>>();

        StatsSummary {
            total_queues: queues.len(),
            queues,
        }
    }

    /// Releases every blocked dequeue and stops new ones from blocking.
    /// Queued messages stay available to non-blocking polls.
    pub fn shutdown(&self) {
        let woken = self.waiters.shutdown();
        tracing::info!(woken, "broker shutting down");
    }

    pub fn is_shutdown(&self) -> bool {
        self.waiters.is_shutdown()
    }
}
