pub mod api;
pub mod config;
pub mod crypto;
pub mod db;
pub mod diet;
pub mod models;
pub mod pages;
pub mod session;
pub mod store;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::crypto::Pbkdf2Verifier;
use crate::diet::{BmiTemplateGenerator, FoodTable, FoodTableGenerator, PlanGenerator};
use crate::store::{Store, StoreError};

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Store initialization failed: {0}")]
    Store(#[from] StoreError),

    #[error("Async runtime failed to start: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("{0}")]
    Server(String),
}

/// Food-table sampling when a table is configured, BMI templates otherwise.
pub fn build_generator(config: &Config) -> Arc<dyn PlanGenerator> {
    match config.food_table.as_deref() {
        Some(path) => Arc::new(FoodTableGenerator::new(FoodTable::load_or_default(Some(path)))),
        None => Arc::new(BmiTemplateGenerator),
    }
}

pub fn run() -> Result<(), StartupError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = Config::from_env();
    let store = Store::init(&config.database_path(), Arc::new(Pbkdf2Verifier::default()))?;
    let generator = build_generator(&config);
    tracing::info!(generator = generator.name(), "Plan generator selected");

    let ctx = api::ApiContext::new(
        Arc::new(store),
        generator,
        Duration::from_secs(config.session_timeout_secs),
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let mut server = api::serve(ctx, config.bind)
            .await
            .map_err(StartupError::Server)?;
        tracing::info!(addr = %server.addr, started_at = %server.started_at, "Listening");

        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Cannot listen for shutdown signal: {e}");
        }
        server.shutdown();
        server.wait().await;
        Ok::<(), StartupError>(())
    })
}
