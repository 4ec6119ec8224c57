// Queue module exports

pub mod broker;
pub mod message;
pub mod message_queue;
pub mod store;
pub mod waiters;

pub use broker::{Broker, QueueStatsInfo, StatsSummary};
pub use message::Message;
pub use message_queue::{MessageQueue, QueueStats};
pub use store::QueueStore;
pub use waiters::{WaitCoordinator, WakeReason, Waiter};
