#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use eternal_elixirs::{
    config::{database, settings::Settings},
    errors::Result,
    web::{AppState, serve},
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (non-fatal, env vars can be set externally)
    dotenv().ok();

    // 3. Load settings from the environment and the optional config file
    let settings = Settings::load()
        .inspect(|s| info!(tax_rate = %s.tax_rate, "Settings loaded"))
        .inspect_err(|e| error!("Failed to load settings: {e}"))?;

    // 4. Initialize database and create tables
    let db = database::init_db(&settings.database_url)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {e}"))?;

    // 5. Seed shipping options on first run
    database::seed_shipping_options(&db, &settings)
        .await
        .inspect_err(|e| error!("Failed to seed shipping options: {e}"))?;

    // 6. Serve the storefront
    let state = AppState::new(db, Arc::new(settings));
    serve(state).await
}
