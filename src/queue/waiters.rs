use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::time::Instant;

/// Why a parked consumer stopped waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeReason {
    /// A message was appended to the watched queue.
    Delivered,
    TimedOut,
    ShuttingDown,
}

struct Slot {
    id: u64,
    wake: oneshot::Sender<WakeReason>,
}

#[derive(Default)]
struct Registry {
    shutdown: bool,
    next_id: u64,
    waiters: HashMap<String, VecDeque<Slot>>,
}

impl Registry {
    /// Wakes the oldest live waiter on `name`. Slots whose receiver is gone are skipped.
    fn notify_one(&mut self, name: &str) -> bool {
        let Some(slots) = self.waiters.get_mut(name) else {
            return false;
        };
        let mut woken = false;
        while let Some(slot) = slots.pop_front() {
            if slot.wake.send(WakeReason::Delivered).is_ok() {
                woken = true;
                break;
            }
        }
        if slots.is_empty() {
            self.waiters.remove(name);
        }
        woken
    }

    fn remove(&mut self, name: &str, id: u64) -> bool {
        let Some(slots) = self.waiters.get_mut(name) else {
            return false;
        };
        let before = slots.len();
        slots.retain(|slot| slot.id != id);
        let removed = slots.len() != before;
        if slots.is_empty() {
            self.waiters.remove(name);
        }
        removed
    }
}

/// Per-queue registry of parked consumers.
///
/// Registration, notification and shutdown all happen under one lock, so a waiter is
/// either in the registry when an event fires or learns about it from its channel.
/// Every waiter is woken at most once: its wake channel is a oneshot.
#[derive(Clone, Default)]
pub struct WaitCoordinator {
    registry: Arc<Mutex<Registry>>,
}

impl WaitCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parks a new waiter at the back of `name`'s line.
    ///
    /// Once shutdown has begun the returned waiter is already woken with
    /// [`WakeReason::ShuttingDown`], so waiting on it never blocks.
    pub fn register(&self, name: &str) -> Waiter {
        let (tx, rx) = oneshot::channel();
        let mut registry = self.registry.lock();
        let id = registry.next_id;
        registry.next_id += 1;

        if registry.shutdown {
            let _ = tx.send(WakeReason::ShuttingDown);
        } else {
            registry
                .waiters
                .entry(name.to_string())
                .or_default()
                .push_back(Slot { id, wake: tx });
        }

        Waiter {
            id,
            name: name.to_string(),
            wake: rx,
            registry: Arc::clone(&self.registry),
            settled: false,
        }
    }

    /// Wakes the oldest waiter on `name`, if any. Returns whether one was woken.
    pub fn notify_one(&self, name: &str) -> bool {
        self.registry.lock().notify_one(name)
    }

    /// Wakes every parked waiter with [`WakeReason::ShuttingDown`] and refuses new ones.
    /// Returns how many waiters were woken.
    pub fn shutdown(&self) -> usize {
        let mut registry = self.registry.lock();
        registry.shutdown = true;
        let mut woken = 0;
        for (_, slots) in registry.waiters.drain() {
            for slot in slots {
                if slot.wake.send(WakeReason::ShuttingDown).is_ok() {
                    woken += 1;
                }
            }
        }
        woken
    }

    pub fn is_shutdown(&self) -> bool {
        self.registry.lock().shutdown
    }

    pub fn waiting_count(&self, name: &str) -> usize {
        self.registry.lock().waiters.get(name).map_or(0, VecDeque::len)
    }

    pub fn total_waiting(&self) -> usize {
        self.registry.lock().waiters.values().map(VecDeque::len).sum()
    }
}

/// One parked dequeue call.
///
/// Dropping a waiter withdraws it. If it had already been handed a delivery it never
/// acted on, that delivery is passed to the next waiter in line.
pub struct Waiter {
    id: u64,
    name: String,
    wake: oneshot::Receiver<WakeReason>,
    registry: Arc<Mutex<Registry>>,
    settled: bool,
}

impl Waiter {
    /// Suspends until woken or `timeout` elapses.
    pub async fn wait(self, timeout: Duration) -> WakeReason {
        self.wait_until(deadline_after(timeout)).await
    }

    /// Suspends until woken or `deadline` passes.
    ///
    /// A wake that lands while the timer fires is reported instead of `TimedOut`.
    pub async fn wait_until(mut self, deadline: Instant) -> WakeReason {
        match tokio::time::timeout_at(deadline, &mut self.wake).await {
            Ok(Ok(reason)) => {
                self.settled = true;
                reason
            }
            // The coordinator went away with us still registered.
            Ok(Err(_)) => {
                self.settled = true;
                WakeReason::ShuttingDown
            }
            Err(_) => self.withdraw().unwrap_or(WakeReason::TimedOut),
        }
    }

    /// Withdraws the waiter. If it had already been woken, returns the reason and leaves
    /// acting on it to the caller.
    pub fn cancel(mut self) -> Option<WakeReason> {
        self.withdraw()
    }

    fn withdraw(&mut self) -> Option<WakeReason> {
        if self.settled {
            return None;
        }
        self.settled = true;
        if self.registry.lock().remove(&self.name, self.id) {
            return None;
        }
        // Not in the registry any more: the wake was sent under the lock, so it is
        // already sitting in the channel.
        self.wake.try_recv().ok()
    }
}

impl Drop for Waiter {
    fn drop(&mut self) {
        if let Some(WakeReason::Delivered) = self.withdraw() {
            let forwarded = self.registry.lock().notify_one(&self.name);
            tracing::trace!(queue = %self.name, forwarded, "passing on unused delivery");
        }
    }
}

/// Longest a single wait may last; larger budgets are clamped to it.
pub const MAX_WAIT: Duration = Duration::from_secs(86_400 * 365);

/// `now + timeout`, with the timeout clamped to [`MAX_WAIT`].
pub fn deadline_after(timeout: Duration) -> Instant {
    Instant::now() + timeout.min(MAX_WAIT)
}
