use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::cache::Cache;
use crate::market::{MarketDataProvider, PricedEntity};
use crate::providers::util::with_retry;

const CACHE_TTL: Duration = Duration::from_secs(60);
const RETRIES: usize = 2;
const RETRY_DELAY_MS: u64 = 200;

/// Market snapshot provider backed by the CoinGecko markets endpoint.
pub struct CoinGeckoProvider {
    base_url: String,
    cache: Arc<Cache<String, Vec<PricedEntity>>>,
}

impl CoinGeckoProvider {
    pub fn new(base_url: &str, cache: Arc<Cache<String, Vec<PricedEntity>>>) -> Self {
        CoinGeckoProvider {
            base_url: base_url.to_string(),
            cache,
        }
    }
}

#[derive(Deserialize, Debug)]
struct MarketEntry {
    symbol: String,
    name: String,
    current_price: Option<f64>,
    market_cap: Option<f64>,
    #[serde(alias = "price_change_percentage_24h")]
    change_pct_24h: Option<f64>,
}

impl From<MarketEntry> for PricedEntity {
    fn from(entry: MarketEntry) -> Self {
        // Optional fields degrade to documented defaults instead of failing
        let mut entity =
            PricedEntity::new(&entry.symbol, &entry.name, entry.current_price.unwrap_or(0.0));
        entity.market_cap = entry.market_cap;
        entity.change_pct = entry.change_pct_24h;
        entity
    }
}

#[async_trait]
impl MarketDataProvider for CoinGeckoProvider {
    #[instrument(name = "CoinGeckoFetch", skip(self))]
    async fn fetch_markets(&self) -> Result<Vec<PricedEntity>> {
        let url = format!(
            "{}/api/v3/coins/markets?vs_currency=usd",
            self.base_url
        );
        if let Some(cached) = self.cache.get(&url).await {
            return Ok(cached);
        }

        debug!("Requesting market data from {}", url);

        let client = reqwest::Client::builder().user_agent("fxwatch/0.2").build()?;
        let entities = with_retry(|| fetch_once(&client, &url), RETRIES, RETRY_DELAY_MS).await?;
        debug!(count = entities.len(), "Fetched market snapshot");

        self.cache.put(url, entities.clone(), Some(CACHE_TTL)).await;

        Ok(entities)
    }
}

async fn fetch_once(client: &reqwest::Client, url: &str) -> Result<Vec<PricedEntity>> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| anyhow!("Request error: {} for URL: {}", e, url))?;

    if !response.status().is_success() {
        return Err(anyhow!(
            "HTTP error: {} from market data API",
            response.status()
        ));
    }

    let text = response.text().await?;
    let entries: Vec<MarketEntry> = serde_json::from_str(&text)
        .map_err(|e| anyhow!("Failed to parse market data response: {}", e))?;

    Ok(entries.into_iter().map(PricedEntity::from).collect())
}
