use std::time::Duration;

use redis_protocol::resp2::types::OwnedFrame as RespFrame;

use super::utils::{extract_payload, extract_queue_name, extract_wait};
use crate::error::{Error, Result};
use crate::queue::Broker;

pub const COMMANDS: &[&str] = &[
    "PING", "PUT", "GET", "LPUSH", "RPOP", "BRPOP", "LLEN", "STATS", "COMMAND",
];

/// Routes one request frame to the broker and renders the outcome.
/// Bad requests become `-ERR` replies and never reach the broker.
pub async fn handle_command(frame: RespFrame, broker: &Broker) -> RespFrame {
    match dispatch(frame, broker).await {
        Ok(response) => response,
        Err(e) => RespFrame::Error(format!("ERR {}", e)),
    }
}

async fn dispatch(frame: RespFrame, broker: &Broker) -> Result<RespFrame> {
    let cmd = match frame {
        RespFrame::Array(arr) => arr,
        _ => return Err(Error::invalid("expected array")),
    };

    let command_name = match cmd.first() {
        Some(RespFrame::BulkString(data)) | Some(RespFrame::SimpleString(data)) => {
            String::from_utf8_lossy(data).to_uppercase()
        }
        Some(_) => return Err(Error::invalid("invalid command format")),
        None => return Err(Error::invalid("empty command")),
    };

    match command_name.as_str() {
        "PING" => handle_ping(&cmd),
        "PUT" => handle_put(&cmd, broker),
        "GET" => handle_get(&cmd, broker).await,
        "LPUSH" => handle_lpush(&cmd, broker),
        "RPOP" => handle_rpop(&cmd, broker).await,
        "BRPOP" => handle_brpop(&cmd, broker).await,
        "LLEN" => handle_llen(&cmd, broker),
        "STATS" => handle_stats(&cmd, broker),
        "COMMAND" => Ok(handle_command_docs()),
        _ => Err(Error::invalid(format!("unknown command '{}'", command_name))),
    }
}

fn wrong_arity(command: &str) -> Error {
    Error::invalid(format!("wrong number of arguments for '{}' command", command))
}

/// PING [message]
fn handle_ping(cmd: &[RespFrame]) -> Result<RespFrame> {
    match cmd {
        [_] => Ok(RespFrame::SimpleString(b"PONG".to_vec())),
        [_, message] => Ok(message.clone()),
        _ => Err(wrong_arity("ping")),
    }
}

/// PUT queue message
fn handle_put(cmd: &[RespFrame], broker: &Broker) -> Result<RespFrame> {
    let [_, name, payload] = cmd else {
        return Err(wrong_arity("put"));
    };
    let name = extract_queue_name(name)?;
    let payload = extract_payload(payload)?;

    broker.enqueue(&name, payload);
    Ok(RespFrame::SimpleString(b"OK".to_vec()))
}

/// GET queue [wait_seconds]
async fn handle_get(cmd: &[RespFrame], broker: &Broker) -> Result<RespFrame> {
    let (name, wait) = match cmd {
        [_, name] => (extract_queue_name(name)?, Duration::ZERO),
        [_, name, wait] => (extract_queue_name(name)?, extract_wait(wait)?),
        _ => return Err(wrong_arity("get")),
    };

    Ok(match broker.dequeue(&name, wait).await {
        Some(message) => RespFrame::BulkString(message.into_payload().into_bytes()),
        None => RespFrame::Null,
    })
}

/// LPUSH queue value [value ...]
fn handle_lpush(cmd: &[RespFrame], broker: &Broker) -> Result<RespFrame> {
    if cmd.len() < 3 {
        return Err(wrong_arity("lpush"));
    }
    let name = extract_queue_name(&cmd[1])?;
    // Validate everything first so a bad value doesn't leave a partial push behind.
    let payloads = cmd[2..]
        .iter()
        .map(extract_payload)
        .collect::<Result<Vec<_>>>()?;

    let count = payloads.len() as i64;
    for payload in payloads {
        broker.enqueue(&name, payload);
    }
    Ok(RespFrame::Integer(count))
}

/// RPOP queue
async fn handle_rpop(cmd: &[RespFrame], broker: &Broker) -> Result<RespFrame> {
    let [_, name] = cmd else {
        return Err(wrong_arity("rpop"));
    };
    let name = extract_queue_name(name)?;

    Ok(match broker.dequeue(&name, Duration::ZERO).await {
        Some(message) => RespFrame::BulkString(message.into_payload().into_bytes()),
        None => RespFrame::Null,
    })
}

/// BRPOP queue wait_seconds
async fn handle_brpop(cmd: &[RespFrame], broker: &Broker) -> Result<RespFrame> {
    let [_, name, wait] = cmd else {
        return Err(wrong_arity("brpop"));
    };
    let name = extract_queue_name(name)?;
    let wait = extract_wait(wait)?;

    Ok(match broker.dequeue(&name, wait).await {
        Some(message) => RespFrame::Array(vec![
            RespFrame::BulkString(name.into_bytes()),
            RespFrame::BulkString(message.into_payload().into_bytes()),
        ]),
        None => RespFrame::Null,
    })
}

/// LLEN queue
fn handle_llen(cmd: &[RespFrame], broker: &Broker) -> Result<RespFrame> {
    let [_, name] = cmd else {
        return Err(wrong_arity("llen"));
    };
    let name = extract_queue_name(name)?;
    Ok(RespFrame::Integer(broker.len(&name) as i64))
}

/// STATS - JSON snapshot of every queue
fn handle_stats(cmd: &[RespFrame], broker: &Broker) -> Result<RespFrame> {
    if cmd.len() != 1 {
        return Err(wrong_arity("stats"));
    }
    let json = serde_json::to_vec(&broker.stats())
        .map_err(|e| Error::Protocol(e.to_string()))?;
    Ok(RespFrame::BulkString(json))
}

fn handle_command_docs() -> RespFrame {
    RespFrame::Array(
        COMMANDS
            .iter()
            .map(|name| RespFrame::BulkString(name.as_bytes().to_vec()))
            .collect(),
    )
}
