//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development.

use std::net::SocketAddr;
use std::path::PathBuf;

use palaver_proto::constants;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to listen on.
    /// Env: `PALAVER_LISTEN_ADDR`
    /// Default: `0.0.0.0:9090`
    pub listen_addr: SocketAddr,

    /// Path of the append-only history transcript.
    /// Env: `PALAVER_HISTORY_PATH`
    /// Default: `./history.log`
    pub history_path: PathBuf,

    /// Maximum accepted line length in bytes. Lines longer than this
    /// disconnect the offending session.
    /// Env: `PALAVER_MAX_LINE_LEN`
    /// Default: `8192`
    pub max_line_len: usize,

    /// Delay between lines when replaying history to a session, so a slow
    /// receiver is not flooded with the whole transcript at once.
    /// Env: `PALAVER_REPLAY_DELAY_MS`
    /// Default: `10`
    pub replay_delay_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: constants::DEFAULT_LISTEN_ADDR
                .parse()
                .unwrap_or_else(|_| ([0, 0, 0, 0], 9090).into()),
            history_path: PathBuf::from(constants::DEFAULT_HISTORY_FILE),
            max_line_len: constants::DEFAULT_MAX_LINE_LEN,
            replay_delay_ms: constants::DEFAULT_REPLAY_DELAY_MS,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults. Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("PALAVER_LISTEN_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.listen_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid PALAVER_LISTEN_ADDR, using default");
            }
        }

        if let Ok(path) = std::env::var("PALAVER_HISTORY_PATH") {
            config.history_path = PathBuf::from(path);
        }

        if let Ok(val) = std::env::var("PALAVER_MAX_LINE_LEN") {
            if let Ok(n) = val.parse::<usize>() {
                config.max_line_len = n;
            } else {
                tracing::warn!(value = %val, "Invalid PALAVER_MAX_LINE_LEN, using default");
            }
        }

        if let Ok(val) = std::env::var("PALAVER_REPLAY_DELAY_MS") {
            if let Ok(n) = val.parse::<u64>() {
                config.replay_delay_ms = n;
            } else {
                tracing::warn!(value = %val, "Invalid PALAVER_REPLAY_DELAY_MS, using default");
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}
