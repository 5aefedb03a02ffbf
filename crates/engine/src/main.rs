//! CharBldr Engine - validates a rules catalog and reports what it offers.

use std::sync::Arc;

use anyhow::Context;
use charbldr_engine::infrastructure::{
    catalog_loader::load_catalog, config::EngineConfig, memory_store::InMemoryCharacterStore,
};
use charbldr_engine::App;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the engine may run from `crates/engine`).
    load_dotenv_from_repo_root();

    let config = EngineConfig::from_env().context("Invalid engine configuration")?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        catalog = %config.catalog_path.display(),
        shared_equipment_tables = config.equipment_buckets.len(),
        "Starting CharBldr Engine"
    );

    let catalog = load_catalog(&config.catalog_path)
        .await
        .with_context(|| format!("Failed to load {}", config.catalog_path.display()))?;

    let app = App::new(
        catalog,
        Arc::new(config.equipment_buckets),
        Arc::new(InMemoryCharacterStore::new()),
    );
    for line in app.catalog_summary() {
        tracing::info!("{}", line);
    }

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
