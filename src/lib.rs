pub mod cache;
pub mod config;
pub mod convert;
pub mod dataset;
pub mod exchange;
pub mod history;
pub mod log;
pub mod market;
pub mod prices;
pub mod providers;
pub mod rates;
pub mod ui;

use crate::market::PricedEntity;
use crate::rates::RateTable;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// Commands the library can execute, decoupled from the clap surface.
pub enum AppCommand {
    Prices(prices::PricesQuery),
    Convert(exchange::ConvertRequest),
    Rates {
        base: Option<String>,
        search: Option<String>,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxwatch starting...");

    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    // Shared caches so repeated fetches in one run reuse responses
    let market_cache = Arc::new(cache::Cache::<String, Vec<PricedEntity>>::new());
    let rate_cache = Arc::new(cache::Cache::<String, RateTable>::new());

    let market_provider =
        providers::coingecko::CoinGeckoProvider::new(config.market_base_url(), market_cache);
    let rate_provider = providers::exchange_rate::ExchangeRateProvider::new(
        config.rates_base_url(),
        Arc::clone(&rate_cache),
    );

    match command {
        AppCommand::Prices(query) => {
            prices::generate_and_display_prices(&market_provider, &rate_provider, &query).await
        }
        AppCommand::Convert(request) => {
            exchange::run_convert(
                &rate_provider,
                &config.currency,
                config.max_history,
                &request,
            )
            .await
        }
        AppCommand::Rates { base, search } => {
            let base = base.as_deref().unwrap_or(&config.currency);
            exchange::run_rates(&rate_provider, base, search.as_deref()).await
        }
    }
}
