use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::{Buf, BytesMut};
use redis_protocol::resp2::decode::decode;
use redis_protocol::resp2::encode::encode;
use redis_protocol::resp2::types::OwnedFrame as RespFrame;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use super::handler::handle_command;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::queue::Broker;

const INITIAL_RESPONSE_BUFFER: usize = 4096;
const MAX_RESPONSE_BUFFER: usize = 512 * 1024 * 1024;
/// Input buffered while a command is parked; past this the connection stops reading.
const MAX_PENDING_INPUT: usize = 1024 * 1024;

/// RESP front end for a [`Broker`]. Every connection gets its own task.
pub struct RespServer {
    listener: TcpListener,
    broker: Arc<Broker>,
}

impl RespServer {
    pub async fn bind(config: &Config, broker: Arc<Broker>) -> Result<Self> {
        let listener = TcpListener::bind(config.addr()).await?;
        Ok(Self { listener, broker })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves until Ctrl-C.
    pub async fn run(self) -> Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Serves until `shutdown` resolves, then releases every blocked consumer.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tracing::info!("qbroker RESP server listening on {}", self.local_addr()?);
        tokio::pin!(shutdown);

        let result = loop {
            tokio::select! {
                _ = &mut shutdown => break Ok(()),
                accepted = self.listener.accept() => {
                    let (socket, peer_addr) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => break Err(Error::from(e)),
                    };
                    tracing::debug!("New connection from {}", peer_addr);

                    let broker = Arc::clone(&self.broker);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(socket, broker).await {
                            tracing::error!("Connection error from {}: {}", peer_addr, e);
                        }
                    });
                }
            }
        };

        self.broker.shutdown();
        result
    }
}

async fn handle_connection(mut socket: TcpStream, broker: Arc<Broker>) -> Result<()> {
    let mut buffer = BytesMut::with_capacity(4096);

    loop {
        let n = socket.read_buf(&mut buffer).await?;
        tracing::trace!("Read {} bytes, buffer len: {}", n, buffer.len());

        if n == 0 {
            if !buffer.is_empty() {
                tracing::debug!("Connection closed with {} unparsed bytes", buffer.len());
            }
            return Ok(());
        }

        loop {
            let response = match decode(&buffer) {
                Ok(Some((frame, consumed))) => {
                    buffer.advance(consumed);
                    tracing::debug!("Received frame: {:?}", frame);
                    match serve_frame(&mut socket, &mut buffer, frame, &broker).await? {
                        Some(response) => response,
                        None => {
                            tracing::debug!("Client left while its command was pending");
                            return Ok(());
                        }
                    }
                }
                // Incomplete frame, read more.
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("Parse error: {:?}", e);
                    buffer.clear();
                    RespFrame::Error(format!("ERR {}", e))
                }
            };
            socket.write_all(&encode_frame(&response)?).await?;
        }
    }
}

/// Runs one command while watching the socket. A blocked GET/BRPOP must not outlive
/// its client: on EOF the command future is dropped, which withdraws its waiter and
/// passes any wake it already received to the next consumer in line.
///
/// Bytes that arrive meanwhile (pipelined requests) are appended to `buffer`.
/// Returns `None` when the client disconnected before the command finished.
async fn serve_frame(
    socket: &mut TcpStream,
    buffer: &mut BytesMut,
    frame: RespFrame,
    broker: &Broker,
) -> Result<Option<RespFrame>> {
    let command = handle_command(frame, broker);
    tokio::pin!(command);

    loop {
        tokio::select! {
            biased;
            response = &mut command => return Ok(Some(response)),
            read = socket.read_buf(buffer), if buffer.len() < MAX_PENDING_INPUT => {
                if read? == 0 {
                    return Ok(None);
                }
            }
        }
    }
}

pub fn encode_frame(frame: &RespFrame) -> Result<Vec<u8>> {
    let mut size = INITIAL_RESPONSE_BUFFER;
    loop {
        let mut buf = vec![0u8; size];
        match encode(&mut buf, frame) {
            Ok(written) => {
                buf.truncate(written);
                return Ok(buf);
            }
            Err(_) if size < MAX_RESPONSE_BUFFER => size *= 2,
            Err(e) => return Err(Error::Protocol(format!("{:?}", e))),
        }
    }
}
