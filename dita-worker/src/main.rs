mod clock;
mod notification;
mod origin;
mod periodic;
mod permissions;
mod routes;
mod scheduler;
mod singleton;
mod state;
mod worker;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use dita_core::cache::CacheStorage;
use dita_core::config::DitaConfig;
use tracing::{debug, info};

use crate::singleton::WorkerLock;
use crate::state::AppState;
use crate::worker::Worker;

#[derive(Parser)]
#[command(name = "dita-worker")]
#[command(about = "Background worker for dita: offline shell cache and daily notifications")]
struct Args {
    /// Port to listen on (defaults to the configured worker port)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = DitaConfig::load().context("Failed to load config")?;
    let port = args.port.unwrap_or(config.worker.port);

    let cache_root = CacheStorage::default_root()?;
    let lock = WorkerLock::acquire(&cache_root, port)?;
    debug!(lock = %lock.path().display(), "holding worker lock");

    let worker = Arc::new(Worker::from_config(&config, CacheStorage::new(cache_root))?);

    let installer = Arc::clone(&worker);
    tokio::spawn(async move { installer.install_until_done().await });

    // A restarted worker re-arms itself when notifications are allowed.
    worker.handle_schedule_message();

    let app = routes::router(AppState::new(worker));

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("dita-worker listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    info!("dita-worker shut down");
    Ok(())
}
