//! Stockroom server binary.

use anyhow::{Context, Result};
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use std::net::SocketAddr;
use stockroom_core::config::AppConfig;
use stockroom_server::{AppState, create_router};
use stockroom_store::InventoryStore;
use stockroom_store::repos::SessionRepo;
use time::OffsetDateTime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Stockroom - inventory management API server
#[derive(Parser, Debug)]
#[command(name = "stockroomd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "STOCKROOM_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Stockroom v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration. The file is optional: every setting has a default
    // and can be overridden via STOCKROOM_ environment variables.
    let config_path = std::path::Path::new(&args.config);
    let mut figment = Figment::new();

    if config_path.exists() {
        tracing::info!(config_path = %args.config, "Loading configuration from file");
        figment = figment.merge(Toml::file(&args.config));
    } else {
        tracing::debug!("No config file found at {}", args.config);
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("STOCKROOM_").split("__"))
        .extract()
        .context("failed to load configuration")?;

    // Initialize the inventory store
    let store = stockroom_store::from_config(&config.store)
        .await
        .context("failed to initialize inventory store")?;
    store
        .health_check()
        .await
        .context("store health check failed")?;
    tracing::info!("Inventory store initialized");

    // Drop sessions that expired while the server was down
    let pruned = store
        .delete_expired_sessions(OffsetDateTime::now_utc())
        .await
        .context("failed to prune expired sessions")?;
    if pruned > 0 {
        tracing::info!(count = pruned, "Pruned expired sessions");
    }

    // Create application state and router
    let state = AppState::new(config.clone(), store);
    let app = create_router(state);

    // Parse bind address
    let addr: SocketAddr = config.server.bind.parse().context("invalid bind address")?;

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
