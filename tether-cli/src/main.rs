use anyhow::Result;
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tether_server::{AppState, Gateway, HubHandle, RelayHub, build_router};

#[derive(Parser)]
#[command(
    name = "tether",
    about = "Signaling relay between a viewer console and a robot streamer"
)]
struct Args {
    /// Port to listen on.
    #[arg(long, default_value_t = 3000)]
    port: u16,

    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    bind: IpAddr,

    /// Directory of static viewer assets.
    #[arg(long, default_value = "public")]
    static_dir: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let (hub_tx, hub_rx) = mpsc::channel(256);
    let gateway = Gateway::new(hub_tx.clone());
    let hub = RelayHub::new(hub_rx, Arc::new(gateway.clone()));
    tokio::spawn(hub.run());

    let state = AppState {
        hub: HubHandle::new(hub_tx),
        gateway,
        started: Instant::now(),
    };
    let app = build_router(state, &args.static_dir);

    let addr = SocketAddr::from((args.bind, args.port));
    let listener = TcpListener::bind(addr).await?;
    info!("Signaling relay listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
