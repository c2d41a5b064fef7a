//! The session registry and task ledger.
//!
//! [`Registry`] is the authoritative in-memory state of the server: the
//! roster of connected sessions and the task ledger, both behind a single
//! `tokio::sync::Mutex`. One lock covers both because `/task add` reads
//! the caller's nickname and mutates the ledger within one command; a
//! single lock rules out ordering hazards between the two.
//!
//! No operation holds the lock across socket I/O. Broadcast enqueues into
//! each recipient's bounded outbound channel with `try_send`; the actual
//! writes happen in per-session writer tasks. A full or closed channel
//! drops the message for that recipient only (best-effort delivery).

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info};

use palaver_proto::constants::DEFAULT_NICKNAME;

/// Opaque handle identifying one connected session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One connected client.
#[derive(Debug)]
struct Session {
    nickname: String,
    /// Captured at accept time, immutable for the session's lifetime.
    remote_addr: SocketAddr,
    /// Outbound line queue drained by the session's writer task.
    outbound: mpsc::Sender<String>,
}

/// One entry in the task ledger.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: u64,
    pub owner: String,
    pub description: String,
}

#[derive(Debug, Default)]
struct ChatState {
    sessions: HashMap<SessionId, Session>,
    tasks: HashMap<u64, Task>,
    /// Monotonically increasing; ids are never reused, even after delete.
    next_task_id: u64,
}

/// Shared handle to the server's in-memory state.
///
/// Constructed once at startup and cloned into every session task.
#[derive(Clone, Default)]
pub struct Registry {
    state: Arc<Mutex<ChatState>>,
    next_session_id: Arc<AtomicU64>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly accepted connection. The session starts with the
    /// default nickname until it sends `/nickname`.
    pub async fn register(
        &self,
        remote_addr: SocketAddr,
        outbound: mpsc::Sender<String>,
    ) -> SessionId {
        let id = SessionId(self.next_session_id.fetch_add(1, Ordering::Relaxed));
        let session = Session {
            nickname: DEFAULT_NICKNAME.to_string(),
            remote_addr,
            outbound,
        };

        let mut state = self.state.lock().await;
        let prev = state.sessions.insert(id, session);
        // Ids come from a fresh counter; a collision means the registry
        // itself is corrupt.
        assert!(prev.is_none(), "session id {id} registered twice");

        info!(session = %id, addr = %remote_addr, "Session registered");
        id
    }

    /// Remove a session. Idempotent: deregistering an absent handle is a
    /// no-op, so every exit path of a session task can call this safely.
    pub async fn deregister(&self, id: SessionId) {
        let mut state = self.state.lock().await;
        if let Some(session) = state.sessions.remove(&id) {
            info!(
                session = %id,
                addr = %session.remote_addr,
                nickname = %session.nickname,
                "Session deregistered"
            );
        }
    }

    /// Update a session's nickname, returning the previous one.
    ///
    /// Validity of the new name is not enforced here; the empty string is
    /// stored as given.
    pub async fn set_nickname(&self, id: SessionId, nickname: &str) -> Option<String> {
        let mut state = self.state.lock().await;
        let session = state.sessions.get_mut(&id)?;
        let old = std::mem::replace(&mut session.nickname, nickname.to_string());
        Some(old)
    }

    pub async fn nickname_of(&self, id: SessionId) -> Option<String> {
        let state = self.state.lock().await;
        state.sessions.get(&id).map(|s| s.nickname.clone())
    }

    /// Snapshot of all current nicknames. Iteration order is unspecified.
    pub async fn list_nicknames(&self) -> Vec<String> {
        let state = self.state.lock().await;
        state.sessions.values().map(|s| s.nickname.clone()).collect()
    }

    /// Deliver a line to every registered session except `exclude`.
    ///
    /// Enqueues are non-blocking; a session whose outbound queue is full
    /// or whose writer task has gone away simply misses this message.
    pub async fn broadcast(&self, message: &str, exclude: Option<SessionId>) {
        let state = self.state.lock().await;
        for (id, session) in &state.sessions {
            if Some(*id) == exclude {
                continue;
            }

            if session.outbound.try_send(message.to_string()).is_err() {
                debug!(session = %id, "Dropping broadcast for unreachable session");
            }
        }
    }

    pub async fn session_count(&self) -> usize {
        self.state.lock().await.sessions.len()
    }

    // -- Task ledger --

    /// Record a new task and return its assigned id. Ids are unique and
    /// strictly increasing for the life of the process.
    pub async fn add_task(&self, owner: &str, description: &str) -> u64 {
        let mut state = self.state.lock().await;
        state.next_task_id += 1;
        let id = state.next_task_id;
        state.tasks.insert(
            id,
            Task {
                id,
                owner: owner.to_string(),
                description: description.to_string(),
            },
        );

        debug!(task = id, owner = %owner, "Task added");
        id
    }

    /// All tasks, sorted by id.
    pub async fn list_tasks(&self) -> Vec<Task> {
        let state = self.state.lock().await;
        let mut tasks: Vec<Task> = state.tasks.values().cloned().collect();
        tasks.sort_by_key(|t| t.id);
        tasks
    }

    /// Remove a task by its stringified id. Returns whether it existed;
    /// an unparseable id is simply not found.
    pub async fn delete_task(&self, raw_id: &str) -> bool {
        let Ok(id) = raw_id.parse::<u64>() else {
            return false;
        };

        let mut state = self.state.lock().await;
        let removed = state.tasks.remove(&id).is_some();
        if removed {
            debug!(task = id, "Task deleted");
        }
        removed
    }
}
