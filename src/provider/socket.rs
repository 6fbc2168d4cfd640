// src/provider/socket.rs

use std::net::SocketAddr;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::errors::{Result, SignalError};
use crate::provider::parse;
use crate::provider::{Flow, ProviderContext};

/// Accepts TCP connections and ingests one update per line.
#[derive(Debug, Clone)]
pub struct SocketProvider {
    bind: SocketAddr,
}

impl SocketProvider {
    pub fn new(bind: SocketAddr) -> Self {
        Self { bind }
    }

    pub async fn run(self, ctx: &ProviderContext) -> Result<()> {
        let listener = TcpListener::bind(self.bind).await?;
        serve(listener, ctx).await
    }
}

/// Serve connections from an already-bound listener until cancelled.
///
/// Connection tasks live in a `JoinSet`; all of them have finished by the
/// time this returns.
pub async fn serve(listener: TcpListener, ctx: &ProviderContext) -> Result<()> {
    info!(
        provider = %ctx.name(),
        addr = ?listener.local_addr().ok(),
        "socket provider listening"
    );

    let mut connections = JoinSet::new();

    loop {
        let accepted = tokio::select! {
            _ = ctx.token().cancelled() => break,
            Some(done) = connections.join_next(), if !connections.is_empty() => {
                if let Err(err) = done {
                    warn!(provider = %ctx.name(), error = %err, "connection task failed");
                }
                continue;
            }
            res = listener.accept() => res,
        };

        match accepted {
            Ok((stream, peer)) => {
                debug!(provider = %ctx.name(), %peer, "connection accepted");
                let conn_ctx = ctx.clone();
                connections.spawn(async move {
                    if let Err(err) = read_connection(stream, &conn_ctx).await {
                        conn_ctx.fail(&err);
                    }
                    debug!(provider = %conn_ctx.name(), %peer, "connection closed");
                });
            }
            Err(err) => ctx.fail(&SignalError::Io(err)),
        }
    }

    debug!(
        provider = %ctx.name(),
        open = connections.len(),
        "waiting for connections to close"
    );
    while connections.join_next().await.is_some() {}

    Ok(())
}

async fn read_connection(stream: TcpStream, ctx: &ProviderContext) -> Result<()> {
    let mut lines = BufReader::new(stream).lines();

    loop {
        let line = tokio::select! {
            _ = ctx.token().cancelled() => return Ok(()),
            line = lines.next_line() => line?,
        };

        let Some(line) = line else {
            return Ok(());
        };

        match parse::parse_line(&line) {
            Ok(updates) => {
                if ctx.push(updates) == Flow::Stop {
                    return Ok(());
                }
            }
            Err(err) => ctx.fail(&err),
        }
    }
}
