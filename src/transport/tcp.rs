// src/transport/tcp.rs - TCP Session Listener
//! TCP listener and per-connection sessions.
//!
//! Each accepted connection gets its own task. Requests are framed by
//! `read_line`; each line is dispatched synchronously against the engine and
//! the reply is written back before the next line is read, so a session
//! observes its own effects in order. Sessions share nothing but the engine.
//!
//! A client dropping its connection does not retract its orders; whatever it
//! left resting stays in the books.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::signal;
use tracing::{error, info, warn};

use crate::engine::MatchingEngine;
use crate::transport::protocol;
use crate::ServerConfig;

/// Accepts client connections and serves the line protocol.
pub struct TcpServer {
    engine: Arc<MatchingEngine>,
    listener: TcpListener,
}

impl TcpServer {
    /// Bind the configured address. Port 0 binds an ephemeral port.
    pub async fn bind(engine: Arc<MatchingEngine>, config: &ServerConfig) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind to {addr}"))?;
        Ok(Self { engine, listener })
    }

    /// The address the listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("listener has no local address")
    }

    /// Run the accept loop until a shutdown signal arrives.
    pub async fn serve(self) -> Result<()> {
        info!(addr = %self.local_addr()?, "trading server listening");

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            info!(%peer, "client connected");
                            let engine = Arc::clone(&self.engine);
                            tokio::spawn(async move {
                                if let Err(err) = handle_session(engine, stream, peer).await {
                                    warn!(%peer, error = %err, "session ended with error");
                                }
                            });
                        }
                        Err(err) => {
                            error!(error = %err, "failed to accept connection");
                        }
                    }
                }
                _ = signal::ctrl_c() => {
                    info!("shutdown signal received, stopping accept loop");
                    break;
                }
            }
        }

        Ok(())
    }
}

async fn handle_session(
    engine: Arc<MatchingEngine>,
    stream: TcpStream,
    peer: SocketAddr,
) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        let read = reader
            .read_line(&mut line)
            .await
            .context("failed to read from client")?;
        if read == 0 {
            info!(%peer, "client disconnected");
            break;
        }

        let reply = protocol::dispatch(&engine, line.trim());
        writer
            .write_all(reply.text.as_bytes())
            .await
            .context("failed to write reply")?;
        writer.flush().await.context("failed to flush reply")?;

        if reply.close {
            info!(%peer, "client requested disconnect");
            break;
        }
    }

    Ok(())
}
