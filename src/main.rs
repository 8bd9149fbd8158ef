//! wheelhouse - roulette wager-settlement service.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use wheelhouse::api::{ApiServer, AppState};
use wheelhouse::config::ConfigLoader;
use wheelhouse::engine::{OsEntropySource, SpinEngine};
use wheelhouse::metrics::MetricsRegistry;
use wheelhouse::store::RocksStore;

#[derive(Debug, Parser)]
#[command(name = "wheelhouse", about = "Roulette wager-settlement service", version)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Override the HTTP listen port
    #[arg(long)]
    port: Option<u16>,

    /// Override the storage directory
    #[arg(long)]
    data_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wheelhouse=info,tower_http=info".into()),
        )
        .init();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_path(path);
    }
    let mut config = loader.load()?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(data_dir) = cli.data_dir {
        config.storage.data_dir = data_dir;
    }

    info!("Opening store at {}", config.storage.data_dir);
    let store = Arc::new(RocksStore::open(&config.storage.data_dir)?);

    let engine = Arc::new(SpinEngine::new(
        store,
        Arc::new(OsEntropySource),
        config.game.clone(),
    ));
    info!(
        "Settlement engine ready (cooldown: {}ms, table limit: {})",
        config.game.spin_cooldown_ms, config.game.max_total_stake
    );

    let state = Arc::new(AppState::new(engine, Arc::new(MetricsRegistry::new())));
    ApiServer::new(config.server.clone(), state).run().await
}
