//! relayd — session-scoped `WebSocket` relay daemon.

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use relay_server::config::RelayConfig;
use relay_server::metrics::install_recorder;
use relay_server::server::RelayServer;

#[derive(Parser, Debug)]
#[command(name = "relayd", about = "Session-scoped WebSocket relay", version)]
struct Cli {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 8420)]
    port: u16,

    /// Seconds between liveness pings.
    #[arg(long, default_value_t = 3)]
    ping_interval_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = RelayConfig {
        host: cli.host,
        port: cli.port,
        ping_interval_secs: cli.ping_interval_secs,
        ..RelayConfig::default()
    };

    let metrics = install_recorder();
    let server = RelayServer::new(config, metrics);
    let (addr, serve_handle) = server.listen().await?;
    info!(%addr, "relayd started");

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    server.shutdown().graceful(vec![serve_handle], None).await;
    info!("relayd stopped");
    Ok(())
}
