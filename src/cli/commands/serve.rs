use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::database::{self, Stores};
use crate::logging::init_logging;
use crate::routes;
use crate::state::AppState;

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long, short, help = "YAML configuration file; environment variables still override it")]
    pub config: Option<PathBuf>,

    #[arg(long, conflicts_with = "config", help = "Ignore config files and read only the environment")]
    pub env_only: bool,
}

impl ServeArgs {
    fn load_config(&self) -> anyhow::Result<AppConfig> {
        let config = match &self.config {
            Some(path) if !self.env_only => AppConfig::load(path)?,
            _ => AppConfig::from_env()?,
        };
        config.validate()?;
        Ok(config)
    }
}

pub async fn handle(args: ServeArgs) -> anyhow::Result<()> {
    let config = args.load_config()?;
    let _log_guard = init_logging(&config.logging).context("failed to install tracing subscriber")?;

    info!("Starting anch-api in {:?} mode", config.environment);

    let pool = database::connect(&config.database).await?;
    let state = AppState::new(config, Stores::postgres(pool.clone()))?;
    let addr = state.config.bind_addr();
    let app = routes::app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    pool.close().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
