pub mod api;
pub mod chat; // Non-diagnostic assistant
pub mod checker; // Symptom check workflow
pub mod config;
pub mod db;
pub mod journal; // Symptom catalog + check history
pub mod llm;
pub mod metrics; // Health metric tracking
pub mod models;
pub mod prompt;
pub mod reminders; // Medicine reminders
pub mod safety;
pub mod triage; // Severity classification

use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, ConfigError};
use crate::db::DatabaseError;
use crate::llm::{LlmError, OllamaClient, TextGenerator};

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Generation client error: {0}")]
    Llm(#[from] LlmError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("Server error: {0}")]
    Server(String),
}

/// Start the service and block until Ctrl-C.
pub fn run() -> Result<(), StartupError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = AppConfig::from_env()?;
    let conn = db::open_database(&config.db_path)?;
    tracing::info!(path = %config.db_path.display(), "Database ready");

    // Built outside the runtime: the blocking client owns its own runtime.
    let client = OllamaClient::new(&config.llm)?;
    match client.is_model_available() {
        Ok(true) => tracing::info!(model = %config.llm.model, "Model available"),
        Ok(false) => tracing::warn!(
            model = %config.llm.model,
            url = %client.base_url(),
            "Model not pulled; explanations will use the fallback text"
        ),
        Err(e) => tracing::warn!(error = %e, "Generation service unreachable"),
    }
    let generator: Arc<dyn TextGenerator> = Arc::new(client);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    // The last handle to the blocking client is dropped after the runtime.
    let served = Arc::clone(&generator);
    runtime.block_on(async move {
        let ctx = api::ApiContext::new(conn, served);
        let server = api::start_api_server(ctx, config.bind_addr)
            .await
            .map_err(StartupError::Server)?;
        tracing::info!(addr = %server.info.server_addr, "Listening");

        tokio::signal::ctrl_c().await?;
        tracing::info!("Shutdown requested");
        server.stop().await;
        Ok::<(), StartupError>(())
    })
}
