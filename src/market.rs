//! Market data abstractions and core types

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One row of a market snapshot: a priced asset or currency.
///
/// `symbol` is upper-cased on construction so display and duplicate checks
/// agree regardless of how the source spells it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedEntity {
    pub symbol: String,
    pub display_name: String,
    pub price: f64,
    pub market_cap: Option<f64>,
    pub change_pct: Option<f64>,
}

impl PricedEntity {
    pub fn new(symbol: &str, display_name: &str, price: f64) -> Self {
        PricedEntity {
            symbol: symbol.to_uppercase(),
            display_name: display_name.to_string(),
            price,
            market_cap: None,
            change_pct: None,
        }
    }

    pub fn with_market_cap(mut self, market_cap: f64) -> Self {
        self.market_cap = Some(market_cap);
        self
    }

    pub fn with_change_pct(mut self, change_pct: f64) -> Self {
        self.change_pct = Some(change_pct);
        self
    }
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch_markets(&self) -> Result<Vec<PricedEntity>>;
}
