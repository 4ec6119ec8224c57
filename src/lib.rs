// qbroker - in-memory named FIFO message broker
//
// The library holds the broker core (`queue`) and its RESP front end (`resp`).
// Binary entry point is in src/main.rs

pub mod config;
pub mod error;
pub mod queue;
pub mod resp;

pub use config::Config;
pub use error::{Error, Result};
pub use queue::{Broker, Message, MessageQueue, QueueStats, QueueStore, StatsSummary};
pub use queue::{WaitCoordinator, WakeReason, Waiter};
pub use resp::RespServer;
