/// Default TCP listen address for the server.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:9090";

/// Default server address the client connects to.
pub const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:9090";

/// Default file name of the append-only chat transcript.
pub const DEFAULT_HISTORY_FILE: &str = "history.log";

/// Maximum accepted line length in bytes (8 KiB).
///
/// Frames are newline-delimited with no length prefix, so a bound is needed
/// to keep a misbehaving peer from growing the read buffer without limit.
pub const DEFAULT_MAX_LINE_LEN: usize = 8192;

/// Inter-line delay when replaying history to a session, in milliseconds.
pub const DEFAULT_REPLAY_DELAY_MS: u64 = 10;

/// Nickname assigned to a session before it sends `/nickname`.
pub const DEFAULT_NICKNAME: &str = "Anonymous";
