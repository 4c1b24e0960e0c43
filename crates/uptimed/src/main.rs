//! uptimed — the uptime monitor daemon.
//!
//! Single binary that assembles the subsystems:
//! - State store (redb)
//! - Prober
//! - Tick scheduler (probe → apply → compact → reconcile → persist)
//! - HTTP interface (status API, admin config writes, static page)
//!
//! # Usage
//!
//! ```text
//! uptimed --port 8080 --data-dir /var/lib/uptimed --probe-interval 300
//! ```
//!
//! The admin write path is enabled by `--admin-password-hash` (or the
//! `ADMIN_PASSWORD_HASH` environment variable): the hex-encoded SHA-256
//! of the admin password.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::info;

#[derive(Parser)]
#[command(name = "uptimed", about = "uptime monitor daemon")]
struct Cli {
    /// Port to listen on.
    #[arg(long, default_value = "8080")]
    port: u16,

    /// Data directory for persistent state.
    #[arg(long, default_value = "/var/lib/uptimed")]
    data_dir: PathBuf,

    /// Probe tick interval in seconds.
    #[arg(long, default_value = "300")]
    probe_interval: u64,

    /// Hex-encoded SHA-256 of the admin password. Falls back to the
    /// ADMIN_PASSWORD_HASH environment variable; unset disables writes.
    #[arg(long)]
    admin_password_hash: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,uptimed=debug,uptime=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let admin_password_hash = cli
        .admin_password_hash
        .or_else(|| std::env::var("ADMIN_PASSWORD_HASH").ok());

    info!("uptimed starting");

    // Ensure data directory exists.
    std::fs::create_dir_all(&cli.data_dir)?;
    let db_path = cli.data_dir.join("uptimed.redb");

    // ── Initialize subsystems ──────────────────────────────────

    let store = uptime_state::StateStore::open(&db_path)?;
    info!(path = ?db_path, "state store opened");

    let prober = uptime_probe::Prober::new()?;
    info!("prober initialized");

    let ticker = uptime_monitor::TickRunner::new(store.clone(), prober);
    info!(interval = cli.probe_interval, "tick runner initialized");

    if admin_password_hash.is_none() {
        info!("no admin password hash configured, admin writes disabled");
    }

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Start the tick loop ────────────────────────────────────

    let interval = Duration::from_secs(cli.probe_interval);
    let ticker_handle = tokio::spawn(async move {
        ticker.run(interval, shutdown_rx).await;
    });

    // ── Start the HTTP server ──────────────────────────────────

    let router = uptime_api::build_router(store, admin_password_hash);
    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));

    info!(%addr, "HTTP server starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown on Ctrl-C.
    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    server.await?;

    // Wait for the tick loop to drain.
    let _ = ticker_handle.await;

    info!("uptimed stopped");
    Ok(())
}
