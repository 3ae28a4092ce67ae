//! Agency Admin - admin backend for an agency website

use agency_admin::config::Config;
use agency_admin::server::{build_router, build_state};
use agency_admin::setup::run_setup_admin;
use agency_admin::store::FileCredentialStore;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Agency Admin - site admin panel backend
#[derive(Parser, Debug)]
#[command(name = "agency_admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Listen address (overrides config)
    #[arg(short, long, value_name = "ADDR")]
    listen: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create (or replace) the admin user interactively
    SetupAdmin,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration from file if specified, otherwise use default loading
    let mut config = if let Some(ref path) = cli.config {
        let mut config = Config::from_file(path)?;
        config.apply_env();
        config
    } else {
        Config::load()?
    };

    // Initialize tracing
    let log_level = if cli.verbose {
        "agency_admin=trace,tower_http=trace".to_string()
    } else {
        config.log_level.clone()
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Some(Command::SetupAdmin) = cli.command {
        run_setup_admin(&config.data_dir, config.bcrypt_cost).await?;
        return Ok(());
    }

    // CLI overrides
    if let Some(ref addr) = cli.listen {
        config.listen_addr = addr.parse()?;
    }

    info!("Starting Agency Admin server");
    info!("  Listen address: {}", config.listen_addr);
    info!("  Data directory: {:?}", config.data_dir);
    info!("  Public directory: {:?}", config.public_dir);
    info!("  Uploads directory: {:?}", config.uploads_dir);
    info!(
        "  Max upload size: {} MB",
        config.max_upload_bytes / 1024 / 1024
    );
    if !config.cookie_secure {
        warn!("  Session cookie is not marked Secure; enable cookie_secure behind HTTPS");
    }

    let credentials = FileCredentialStore::new(&config.data_dir);
    if !credentials.exists().await {
        warn!(
            "  No admin record at {:?}; run `agency_admin setup-admin` before logging in",
            credentials.path()
        );
    }

    let listen_addr = config.listen_addr;
    let state = build_state(config, Arc::new(credentials));
    let app = build_router(state);

    // Start server with graceful shutdown
    let listener = TcpListener::bind(&listen_addr).await?;
    info!("Agency Admin listening on http://{}", listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Handle shutdown signals (SIGINT, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
