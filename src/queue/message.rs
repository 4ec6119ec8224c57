use std::time::{SystemTime, UNIX_EPOCH};

/// A payload as it sits in a queue. The broker never looks inside `payload`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub payload: String,
    /// Microseconds since the UNIX epoch, taken when the message was appended.
    pub enqueued_at: u64,
}

impl Message {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            enqueued_at: now_micros(),
        }
    }

    pub fn into_payload(self) -> String {
        self.payload
    }
}

fn now_micros() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}
