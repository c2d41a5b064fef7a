use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use palaver_server::config::ServerConfig;
use palaver_server::history::HistoryLog;
use palaver_server::registry::Registry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,palaver_server=debug")),
        )
        .init();

    info!("Starting Palaver chat server v{}", env!("CARGO_PKG_VERSION"));

    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // Bind failure is fatal at startup.
    let listener = TcpListener::bind(config.listen_addr).await?;
    info!(addr = %config.listen_addr, "Server listening");

    let registry = Registry::new();
    let history = HistoryLog::new(config.history_path.clone(), config.replay_delay_ms);
    let config = Arc::new(config);

    tokio::select! {
        result = palaver_server::serve(listener, registry, history, config) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
