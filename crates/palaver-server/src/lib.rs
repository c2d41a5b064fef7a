//! # palaver-server
//!
//! The Palaver chat server: a TCP listener that relays newline-delimited
//! text between connected clients.
//!
//! This crate provides:
//! - **Session registry** tracking every live connection and its nickname
//! - **Broadcast fan-out** delivering each message to everyone but the
//!   sender, best-effort
//! - **Append-only history** persisted to a flat transcript file with
//!   paced `/history` replay
//! - **Task ledger** for the lightweight `/task` commands
//! - **Connection acceptor** spawning one session task per client

pub mod config;
pub mod error;
pub mod history;
pub mod registry;
pub mod session;

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::history::HistoryLog;
use crate::registry::Registry;

/// Accept connections forever, spawning one session task per client.
///
/// Transient accept failures are logged and the loop keeps going; only
/// the caller dropping the future stops it.
pub async fn serve(
    listener: TcpListener,
    registry: Registry,
    history: HistoryLog,
    config: Arc<ServerConfig>,
) -> anyhow::Result<()> {
    loop {
        match listener.accept().await {
            Ok((stream, remote_addr)) => {
                let registry = registry.clone();
                let history = history.clone();
                let config = config.clone();

                tokio::spawn(async move {
                    if let Err(e) =
                        session::run_session(stream, remote_addr, registry, history, &config).await
                    {
                        // Transport errors are ordinary disconnects by the
                        // time they reach here; the session already tore
                        // itself down.
                        info!(addr = %remote_addr, error = %e, "Session ended with error");
                    }
                });
            }
            Err(e) => {
                error!(error = %e, "Error accepting connection");
            }
        }
    }
}
