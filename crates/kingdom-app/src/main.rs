mod app;
mod cli;
mod records;
mod render;
mod sequencer;

use std::sync::Arc;

use kingdom_config::KingdomConfig;
use kingdom_presence::{ProfileStorage, SessionIdentity, SystemClock};
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use crate::app::{Presenter, StoreHandle};

fn init_logging(directive: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"))
            }),
        )
        .init();
}

#[tokio::main]
async fn main() {
    let args = cli::parse();

    let loaded = match &args.config {
        Some(path) => kingdom_config::load_config_from(path),
        None => kingdom_config::load_config(),
    };
    let directive = args.log_level.clone().unwrap_or_else(|| {
        loaded
            .as_ref()
            .map(|c| c.logging.level.as_directive())
            .unwrap_or("info")
            .to_string()
    });
    init_logging(&directive);

    tracing::info!("Kingdom v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut config = loaded.unwrap_or_else(|e| {
        tracing::warn!("Config load failed, using defaults: {e}");
        KingdomConfig::default()
    });
    if let Some(seed) = args.seed {
        config.sequencer.shuffle_seed = Some(seed);
    }
    if let Some(path) = args.records.clone() {
        config.records.path = path;
    }

    let mut records = records::load_records(&config.records.path).unwrap_or_else(|e| {
        tracing::warn!("Prayer records unavailable: {e}");
        Vec::new()
    });
    records::shuffle_records(&mut records, config.sequencer.shuffle_seed);

    let identity = match ProfileStorage::default_location() {
        Some(storage) => SessionIdentity::load_or_create(&storage),
        None => {
            tracing::warn!("No profile directory; using a session-only identity");
            SessionIdentity::generate()
        }
    };
    tracing::info!(client = %identity.client_id, "Session identity ready");

    let store = StoreHandle::connect(&config, &identity.client_id, args.offline).await;

    let presenter = match Presenter::new(
        config,
        records,
        Arc::clone(&store.shared),
        &identity.client_id,
        Arc::new(SystemClock),
        std::io::stdout(),
    ) {
        Ok(presenter) => presenter,
        Err(e) => {
            tracing::error!("Failed to start presenter: {e}");
            return;
        }
    };

    if let Err(e) = presenter.run(BufReader::new(tokio::io::stdin())).await {
        tracing::error!("Presenter error: {e}");
    }
    store.close().await;
    tracing::info!("Shutdown complete");
}
