pub mod calculator;
pub mod cli;
pub mod core;
pub mod providers;
pub mod refresh;
pub mod service;
pub mod store;

use anyhow::Result;
use rust_decimal::Decimal;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub enum AppCommand {
    Rates,
    Refresh,
    To { amount: Decimal, currency: String },
    From { amount: Decimal, currency: String },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("twfx starting...");

    let config = match config_path {
        Some(path) => core::config::AppConfig::load_from_path(path)?,
        None => core::config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let service = service::RateService::from_config(&config)?;

    match command {
        AppCommand::Rates => cli::rates::show(&service).await,
        AppCommand::Refresh => cli::rates::refresh(&service).await,
        AppCommand::To { amount, currency } => {
            cli::convert::from_base(&service, amount, &currency).await
        }
        AppCommand::From { amount, currency } => {
            cli::convert::to_base(&service, amount, &currency).await
        }
    }
}
