//! The append-only chat transcript.
//!
//! One flat text file, one line per message:
//! `<timestamp>: <nickname> - <message>`. The timestamp is RFC-2822
//! (the RFC-1123 layout), human-readable and parseable.
//!
//! Appends are best-effort: a failure is logged for the operator and never
//! surfaced to the sending client, so chat keeps working without history.
//! Each session opens its own append handle; concurrent appends rely on
//! the OS's append-atomicity for lines of this size. The transcript is an
//! operator-facing record, not authoritative state.

use std::path::PathBuf;

use chrono::Utc;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

/// Notice sent to the requester when the transcript cannot be opened.
const REPLAY_OPEN_ERROR: &str = "Error reading history.";
/// Notice sent when reading fails partway through a replay.
const REPLAY_READ_ERROR: &str = "Error occurred while reading history.";

/// Handle to the transcript file. Cheap to clone; every session derives
/// its own appender from it.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
    replay_delay: Duration,
}

impl HistoryLog {
    pub fn new(path: PathBuf, replay_delay_ms: u64) -> Self {
        Self {
            path,
            replay_delay: Duration::from_millis(replay_delay_ms),
        }
    }

    /// Open a per-session append handle, creating the file if missing.
    pub async fn appender(&self) -> std::io::Result<HistoryAppender> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        Ok(HistoryAppender { file })
    }

    /// Stream the whole transcript, front to back, into a session's
    /// outbound queue, pacing lines so a slow receiver is not flooded.
    ///
    /// On open failure the requester gets a single error notice. A read
    /// failure partway through logs, notifies, and stops.
    pub async fn replay(&self, sink: &mpsc::Sender<String>) {
        let file = match File::open(&self.path).await {
            Ok(file) => file,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to open history for replay");
                let _ = sink.send(REPLAY_OPEN_ERROR.to_string()).await;
                return;
            }
        };

        let mut lines = BufReader::new(file).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if sink.send(line).await.is_err() {
                        // Requester went away mid-replay.
                        debug!("History replay aborted: session closed");
                        return;
                    }
                    sleep(self.replay_delay).await;
                }
                Ok(None) => return,
                Err(e) => {
                    warn!(error = %e, "Error reading from history file");
                    let _ = sink.send(REPLAY_READ_ERROR.to_string()).await;
                    return;
                }
            }
        }
    }
}

/// One session's private append handle to the transcript.
#[derive(Debug)]
pub struct HistoryAppender {
    file: File,
}

impl HistoryAppender {
    /// Append one chat message. Failures are logged, never propagated:
    /// the message is still broadcast even if persistence fails.
    ///
    /// The handle is flushed before returning. `tokio::fs::File` buffers
    /// writes into a background blocking task, and a `/history` replay can
    /// run right after the broadcast; without the flush the line may not
    /// be in the file yet.
    pub async fn append(&mut self, nickname: &str, message: &str) {
        let entry = format_entry(nickname, message);
        if let Err(e) = self.write_entry(&entry).await {
            warn!(error = %e, "Failed to append to history log");
        }
    }

    async fn write_entry(&mut self, entry: &str) -> std::io::Result<()> {
        self.file.write_all(entry.as_bytes()).await?;
        self.file.flush().await
    }
}

/// Format one transcript line, trailing newline included.
fn format_entry(nickname: &str, message: &str) -> String {
    format!("{}: {} - {}\n", Utc::now().to_rfc2822(), nickname, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use tempfile::TempDir;

    fn test_log(dir: &TempDir) -> HistoryLog {
        // Zero replay delay keeps the tests fast.
        HistoryLog::new(dir.path().join("history.log"), 0)
    }

    #[tokio::test]
    async fn test_append_replay_roundtrip() {
        let dir = TempDir::new().unwrap();
        let log = test_log(&dir);

        let mut appender = log.appender().await.unwrap();
        appender.append("Alice", "hello").await;
        appender.append("Bob", "hi there").await;

        let (tx, mut rx) = mpsc::channel(16);
        log.replay(&tx).await;
        drop(tx);

        let mut lines = Vec::new();
        while let Some(line) = rx.recv().await {
            lines.push(line);
        }

        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("Alice - hello"));
        assert!(lines[1].ends_with("Bob - hi there"));
    }

    #[tokio::test]
    async fn test_append_visible_as_soon_as_it_returns() {
        let dir = TempDir::new().unwrap();
        let log = test_log(&dir);

        let mut appender = log.appender().await.unwrap();
        appender.append("Alice", "hello").await;

        // No replay, no extra awaits: the line must already be on disk.
        let contents = std::fs::read_to_string(dir.path().join("history.log")).unwrap();
        assert!(contents.ends_with("Alice - hello\n"), "got {contents:?}");

        appender.append("Alice", "again").await;
        let contents = std::fs::read_to_string(dir.path().join("history.log")).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_replay_missing_file_sends_notice() {
        let dir = TempDir::new().unwrap();
        let log = test_log(&dir);

        let (tx, mut rx) = mpsc::channel(16);
        log.replay(&tx).await;

        assert_eq!(rx.recv().await.unwrap(), "Error reading history.");
    }

    #[tokio::test]
    async fn test_independent_appenders() {
        let dir = TempDir::new().unwrap();
        let log = test_log(&dir);

        let mut a = log.appender().await.unwrap();
        let mut b = log.appender().await.unwrap();
        a.append("Alice", "from a").await;
        b.append("Bob", "from b").await;

        let (tx, mut rx) = mpsc::channel(16);
        log.replay(&tx).await;
        drop(tx);

        let mut lines = Vec::new();
        while let Some(line) = rx.recv().await {
            lines.push(line);
        }
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_entry_timestamp_parseable() {
        let entry = format_entry("Alice", "hello");
        let (timestamp, rest) = entry.split_once(": ").unwrap();
        assert!(DateTime::parse_from_rfc2822(timestamp).is_ok());
        assert_eq!(rest, "Alice - hello\n");
    }
}
