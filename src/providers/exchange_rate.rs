use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::cache::Cache;
use crate::providers::util::with_retry;
use crate::rates::{RateProvider, RateTable};

const CACHE_TTL: Duration = Duration::from_secs(60);
const RETRIES: usize = 2;
const RETRY_DELAY_MS: u64 = 200;

/// Rate table provider backed by the exchangerate-api "latest" endpoint.
pub struct ExchangeRateProvider {
    base_url: String,
    cache: Arc<Cache<String, RateTable>>,
}

impl ExchangeRateProvider {
    pub fn new(base_url: &str, cache: Arc<Cache<String, RateTable>>) -> Self {
        ExchangeRateProvider {
            base_url: base_url.to_string(),
            cache,
        }
    }
}

#[derive(Deserialize, Debug)]
struct LatestRatesResponse {
    base: String,
    rates: RateTable,
}

#[async_trait]
impl RateProvider for ExchangeRateProvider {
    #[instrument(name = "RatesFetch", skip(self), fields(base = %base))]
    async fn fetch_rates(&self, base: &str) -> Result<RateTable> {
        let url = format!("{}/v4/latest/{}", self.base_url, base.to_uppercase());
        if let Some(cached) = self.cache.get(&url).await {
            return Ok(cached);
        }

        debug!("Requesting exchange rates from {}", url);

        let client = reqwest::Client::builder().user_agent("fxwatch/0.2").build()?;
        let rates = with_retry(|| fetch_once(&client, &url, base), RETRIES, RETRY_DELAY_MS).await?;

        debug!(count = rates.len(), "Fetched rate table");
        self.cache.put(url, rates.clone(), Some(CACHE_TTL)).await;

        Ok(rates)
    }
}

async fn fetch_once(client: &reqwest::Client, url: &str, base: &str) -> Result<RateTable> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| anyhow!("Request error: {} for base: {}", e, base))?;

    if !response.status().is_success() {
        return Err(anyhow!(
            "HTTP error: {} for base: {}",
            response.status(),
            base
        ));
    }

    let text = response.text().await?;
    let data: LatestRatesResponse = serde_json::from_str(&text)
        .map_err(|e| anyhow!("Failed to parse rates response for {}: {}", base, e))?;

    if !data.base.eq_ignore_ascii_case(base) {
        warn!(requested = %base, got = %data.base, "Rate table base mismatch");
    }

    // Rates must be strictly positive; anything else is source garbage
    let rates: RateTable = data
        .rates
        .into_iter()
        .filter(|(code, rate)| {
            let keep = *rate > 0.0 && rate.is_finite();
            if !keep {
                warn!(code, rate, "Discarding non-positive rate");
            }
            keep
        })
        .map(|(code, rate)| (code.to_uppercase(), rate))
        .collect();

    if rates.is_empty() {
        return Err(anyhow!("No usable rates returned for base: {}", base));
    }

    Ok(rates)
}
