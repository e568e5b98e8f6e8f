use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

mod config;
mod db;
mod export;
mod geocode;
mod store;
mod upstream;
mod util;
mod weather;
mod web;

use crate::config::{AppConfig, CliArgs, LoggingConfig};
use crate::util::logging::init_tracing;
use crate::web::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args = CliArgs::parse();

    // Load configuration; logging comes up right after since it is configurable too
    let config = match AppConfig::new(&args) {
        Ok(config) => config,
        Err(e) => {
            init_tracing(&LoggingConfig { json: args.log_json });
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };
    init_tracing(&config.logging);

    if config.weather.api_key.is_empty() {
        error!("No OpenWeatherMap API key configured; set OWM_API_KEY or weather.api_key");
    }

    info!("Opening database {}", config.database.connection_string);
    let pool = match db::init_pool(&config.database) {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e.into());
        }
    };

    let web_config = config.web.clone();
    let app_state = Arc::new(AppState::new(config, pool)?);

    info!("Starting weather-ledger on {}:{}", web_config.host, web_config.port);
    match web::run_server(web_config, app_state).await {
        Ok(_) => info!("Server stopped gracefully"),
        Err(e) => {
            error!("Server error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
