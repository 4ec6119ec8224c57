use std::time::Duration;

use redis_protocol::resp2::types::OwnedFrame as RespFrame;

use crate::error::{Error, Result};

/// Strict UTF-8: bytes are never replaced, a bad sequence rejects the request.
pub fn extract_string(frame: &RespFrame) -> Result<String> {
    match frame {
        RespFrame::BulkString(data) | RespFrame::SimpleString(data) => {
            String::from_utf8(data.clone())
                .map_err(|_| Error::invalid("value must be valid UTF-8"))
        }
        _ => Err(Error::invalid("invalid string")),
    }
}

/// A queue name: any non-empty string.
pub fn extract_queue_name(frame: &RespFrame) -> Result<String> {
    let name = extract_string(frame)?;
    if name.is_empty() {
        return Err(Error::invalid("queue name is missing"));
    }
    Ok(name)
}

/// A message payload: any non-empty string, passed through untouched.
pub fn extract_payload(frame: &RespFrame) -> Result<String> {
    let payload = extract_string(frame)?;
    if payload.is_empty() {
        return Err(Error::invalid("message is missing"));
    }
    Ok(payload)
}

/// Wait budget in seconds, fractions allowed. Negative values mean "don't wait".
pub fn extract_wait(frame: &RespFrame) -> Result<Duration> {
    let secs = match frame {
        RespFrame::Integer(n) => *n as f64,
        RespFrame::BulkString(data) | RespFrame::SimpleString(data) => {
            String::from_utf8_lossy(data)
                .trim()
                .parse::<f64>()
                .map_err(|_| Error::invalid("invalid timeout"))?
        }
        _ => return Err(Error::invalid("invalid timeout")),
    };
    wait_budget(secs)
}

pub fn wait_budget(secs: f64) -> Result<Duration> {
    if !secs.is_finite() {
        return Err(Error::invalid("invalid timeout"));
    }
    if secs <= 0.0 {
        return Ok(Duration::ZERO);
    }
    Ok(Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX))
}
