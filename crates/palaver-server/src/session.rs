//! Per-connection session handling.
//!
//! Each accepted connection gets one [`run_session`] task. The socket is
//! framed into newline-delimited lines with a length bound; the write half
//! is owned by a small writer task fed from a bounded mpsc queue, so no
//! registry operation ever blocks on a peer's socket.
//!
//! The read loop is the session's only suspension point: one line at a
//! time until the peer closes, errors, or sends `/quit`. Every exit path
//! deregisters and broadcasts a departure notice.

use std::net::SocketAddr;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::{Framed, LinesCodec};
use tracing::{debug, info, warn};

use palaver_proto::constants::DEFAULT_NICKNAME;
use palaver_proto::Command;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::history::HistoryLog;
use crate::registry::Registry;

/// Outbound queue depth per session. A session that falls this far behind
/// starts missing broadcasts rather than stalling everyone else.
const OUTBOUND_QUEUE_DEPTH: usize = 256;

/// Drive one client connection until it disconnects or quits.
pub async fn run_session(
    stream: TcpStream,
    remote_addr: SocketAddr,
    registry: Registry,
    history: HistoryLog,
    config: &ServerConfig,
) -> Result<(), ServerError> {
    let framed = Framed::new(stream, LinesCodec::new_with_max_length(config.max_line_len));
    let (mut sink, mut lines) = framed.split();

    let (outbound_tx, mut outbound_rx) = mpsc::channel::<String>(OUTBOUND_QUEUE_DEPTH);

    // Writer task: sole owner of the write half. Ends when the channel
    // closes (session over) or the peer stops accepting writes.
    let writer = tokio::spawn(async move {
        while let Some(line) = outbound_rx.recv().await {
            if sink.send(line).await.is_err() {
                break;
            }
        }
    });

    let id = registry.register(remote_addr, outbound_tx.clone()).await;
    let mut nickname = registry
        .nickname_of(id)
        .await
        .unwrap_or_else(|| DEFAULT_NICKNAME.to_string());

    // Per-session append handle. If the transcript cannot be opened, chat
    // continues without history for this session.
    let mut appender = match history.appender().await {
        Ok(appender) => Some(appender),
        Err(e) => {
            warn!(addr = %remote_addr, error = %e, "Error opening history log file");
            None
        }
    };

    info!(addr = %remote_addr, nickname = %nickname, "Client connected");

    let result = loop {
        let line = match lines.next().await {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                // Oversized line or transport error; either way the
                // session is over.
                debug!(addr = %remote_addr, error = %e, "Read failed");
                break Err(ServerError::from(e));
            }
            None => break Ok(()),
        };

        let Some(command) = Command::parse(line.trim()) else {
            // Recognized prefix, missing argument: silently ignored.
            continue;
        };

        match command {
            Command::Quit => {
                let _ = outbound_tx.send("Goodbye!".to_string()).await;
                break Ok(());
            }

            Command::History => {
                history.replay(&outbound_tx).await;
            }

            Command::Nickname(new_name) => {
                let old = registry
                    .set_nickname(id, new_name)
                    .await
                    .unwrap_or_else(|| nickname.clone());
                nickname = new_name.to_string();

                let _ = outbound_tx
                    .send(format!("Nickname changed to {new_name}"))
                    .await;
                info!(
                    addr = %remote_addr,
                    old = %old,
                    new = %new_name,
                    "Client changed nickname"
                );
                registry
                    .broadcast(&format!("'{old}' changed nickname to '{new_name}'"), Some(id))
                    .await;
            }

            Command::Users => {
                let users = registry.list_nicknames().await.join(", ");
                let _ = outbound_tx.send(format!("Connected users: {users}")).await;
            }

            Command::TaskAdd(description) => {
                let task_id = registry.add_task(&nickname, description).await;
                let _ = outbound_tx
                    .send(format!("Task added with ID {task_id}"))
                    .await;
            }

            Command::TaskList => {
                let tasks = registry.list_tasks().await;
                let reply = if tasks.is_empty() {
                    "No tasks found.".to_string()
                } else {
                    tasks
                        .iter()
                        .map(|t| {
                            format!(
                                "ID: {}, Owner: {}, Description: {}",
                                t.id, t.owner, t.description
                            )
                        })
                        .collect::<Vec<_>>()
                        .join("; ")
                };
                let _ = outbound_tx.send(reply).await;
            }

            Command::TaskDelete(raw_id) => {
                let reply = if registry.delete_task(raw_id).await {
                    "Task deleted successfully."
                } else {
                    "Task not found."
                };
                let _ = outbound_tx.send(reply.to_string()).await;
            }

            Command::Chat(message) => {
                if let Some(appender) = appender.as_mut() {
                    appender.append(&nickname, message).await;
                }
                registry
                    .broadcast(&format!("{nickname}: {message}"), Some(id))
                    .await;
            }
        }
    };

    // Unconditional teardown: departure notice to the others, then
    // idempotent deregistration.
    info!(addr = %remote_addr, nickname = %nickname, "Client disconnected");
    registry
        .broadcast(&format!("{nickname} disconnected from the chat!"), Some(id))
        .await;
    registry.deregister(id).await;

    // Closing the channel lets the writer flush queued lines and exit.
    drop(outbound_tx);
    let _ = writer.await;

    result
}
