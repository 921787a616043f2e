//! In-memory snapshot store with filter and sort views.
//!
//! Holds the last successfully fetched collection of priced entities and
//! answers read-only queries against it. Queries always return new vectors;
//! the snapshot itself is only ever replaced wholesale by [`DatasetStore::load`].

use crate::market::PricedEntity;
use std::cmp::Ordering;
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Symbol,
    Name,
    Price,
    MarketCap,
}

impl Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SortKey::Symbol => "symbol",
                SortKey::Name => "name",
                SortKey::Price => "price",
                SortKey::MarketCap => "market-cap",
            }
        )
    }
}

impl FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "symbol" => Ok(SortKey::Symbol),
            "name" => Ok(SortKey::Name),
            "price" => Ok(SortKey::Price),
            "market-cap" | "market_cap" => Ok(SortKey::MarketCap),
            _ => Err(anyhow::anyhow!("Invalid sort key: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Store for the current market snapshot.
#[derive(Debug, Default)]
pub struct DatasetStore {
    snapshot: Vec<PricedEntity>,
}

impl DatasetStore {
    pub fn new() -> Self {
        DatasetStore::default()
    }

    /// Replaces the snapshot wholesale. Entries whose symbol duplicates an
    /// earlier one (case-insensitively) are discarded, first occurrence wins.
    /// Loading the same collection twice leaves the store unchanged.
    pub fn load(&mut self, entities: Vec<PricedEntity>) {
        let mut seen: Vec<String> = Vec::with_capacity(entities.len());
        let mut snapshot = Vec::with_capacity(entities.len());
        for entity in entities {
            let key = entity.symbol.to_uppercase();
            if seen.contains(&key) {
                tracing::debug!(symbol = %entity.symbol, "Dropping duplicate symbol");
                continue;
            }
            seen.push(key);
            snapshot.push(entity);
        }
        self.snapshot = snapshot;
    }

    pub fn entities(&self) -> &[PricedEntity] {
        &self.snapshot
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    /// Case-insensitive substring match against symbol or display name.
    /// An empty query returns the full snapshot in its original order.
    pub fn filter(&self, query: &str) -> Vec<PricedEntity> {
        if query.is_empty() {
            return self.snapshot.clone();
        }
        let needle = query.to_lowercase();
        self.snapshot
            .iter()
            .filter(|e| {
                e.symbol.to_lowercase().contains(&needle)
                    || e.display_name.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    /// Returns the snapshot re-ordered by `key`; never mutates the snapshot.
    pub fn sort_by(&self, key: SortKey, direction: SortDirection) -> Vec<PricedEntity> {
        sort_entities(self.snapshot.clone(), key, direction)
    }

    /// Filter first, sort second. Filtering never re-orders, so the sort sees
    /// the matches in snapshot order.
    pub fn select(
        &self,
        query: &str,
        sort: Option<(SortKey, SortDirection)>,
    ) -> Vec<PricedEntity> {
        let matches = self.filter(query);
        match sort {
            Some((key, direction)) => sort_entities(matches, key, direction),
            None => matches,
        }
    }
}

/// Stable sort over an owned sequence of entities.
///
/// String keys compare case-insensitively; numeric keys compare numerically
/// with a missing value ordered as 0. Descending reverses the comparator
/// rather than the result, so equal keys keep their input order either way.
pub fn sort_entities(
    mut entities: Vec<PricedEntity>,
    key: SortKey,
    direction: SortDirection,
) -> Vec<PricedEntity> {
    entities.sort_by(|a, b| {
        let ordering = compare(a, b, key);
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
    entities
}

fn compare(a: &PricedEntity, b: &PricedEntity, key: SortKey) -> Ordering {
    match key {
        SortKey::Symbol => a.symbol.to_lowercase().cmp(&b.symbol.to_lowercase()),
        SortKey::Name => a
            .display_name
            .to_lowercase()
            .cmp(&b.display_name.to_lowercase()),
        SortKey::Price => a.price.total_cmp(&b.price),
        SortKey::MarketCap => a
            .market_cap
            .unwrap_or(0.0)
            .total_cmp(&b.market_cap.unwrap_or(0.0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<PricedEntity> {
        vec![
            PricedEntity::new("BTC", "Bitcoin", 67000.0).with_market_cap(1.3e12),
            PricedEntity::new("ETH", "Ethereum", 3500.0).with_market_cap(4.2e11),
            PricedEntity::new("USDT", "Tether", 1.0).with_market_cap(1.1e11),
            PricedEntity::new("DOGE", "Dogecoin", 0.12),
        ]
    }

    fn symbols(entities: &[PricedEntity]) -> Vec<&str> {
        entities.iter().map(|e| e.symbol.as_str()).collect()
    }

    #[test]
    fn test_empty_query_returns_snapshot_order() {
        let mut store = DatasetStore::new();
        store.load(sample());

        let all = store.filter("");
        assert_eq!(symbols(&all), vec!["BTC", "ETH", "USDT", "DOGE"]);
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let mut store = DatasetStore::new();
        store.load(sample());

        let lower = store.filter("usd");
        let upper = store.filter("USD");
        assert_eq!(lower, upper);
        assert_eq!(symbols(&lower), vec!["USDT"]);
    }

    #[test]
    fn test_filter_matches_name_and_symbol() {
        let mut store = DatasetStore::new();
        store.load(sample());

        // "coin" hits Bitcoin and Dogecoin via display name
        assert_eq!(symbols(&store.filter("coin")), vec!["BTC", "DOGE"]);
        // symbol-only hit
        assert_eq!(symbols(&store.filter("eth")), vec!["ETH", "USDT"]);
    }

    #[test]
    fn test_filter_no_match_is_empty() {
        let mut store = DatasetStore::new();
        store.load(sample());
        assert!(store.filter("xmr").is_empty());
    }

    #[test]
    fn test_sort_numeric_ascending_and_descending() {
        let mut store = DatasetStore::new();
        store.load(sample());

        let asc = store.sort_by(SortKey::Price, SortDirection::Ascending);
        assert_eq!(symbols(&asc), vec!["DOGE", "USDT", "ETH", "BTC"]);

        let desc = store.sort_by(SortKey::Price, SortDirection::Descending);
        let mut reversed = asc.clone();
        reversed.reverse();
        assert_eq!(desc, reversed);
    }

    #[test]
    fn test_sort_missing_market_cap_counts_as_zero() {
        let mut store = DatasetStore::new();
        store.load(sample());

        let asc = store.sort_by(SortKey::MarketCap, SortDirection::Ascending);
        assert_eq!(symbols(&asc)[0], "DOGE");
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let mut store = DatasetStore::new();
        store.load(vec![
            PricedEntity::new("AAA", "First", 10.0),
            PricedEntity::new("BBB", "Second", 10.0),
            PricedEntity::new("CCC", "Third", 5.0),
        ]);

        let asc = store.sort_by(SortKey::Price, SortDirection::Ascending);
        assert_eq!(symbols(&asc), vec!["CCC", "AAA", "BBB"]);

        // Equal keys keep snapshot order under descending too
        let desc = store.sort_by(SortKey::Price, SortDirection::Descending);
        assert_eq!(symbols(&desc), vec!["AAA", "BBB", "CCC"]);
    }

    #[test]
    fn test_sort_string_key_is_case_insensitive() {
        let mut store = DatasetStore::new();
        store.load(vec![
            PricedEntity::new("ZRX", "aardvark", 1.0),
            PricedEntity::new("ABC", "Zebra", 1.0),
        ]);

        let by_name = store.sort_by(SortKey::Name, SortDirection::Ascending);
        assert_eq!(symbols(&by_name), vec!["ZRX", "ABC"]);
    }

    #[test]
    fn test_duplicate_symbols_first_wins() {
        let mut store = DatasetStore::new();
        store.load(vec![
            PricedEntity::new("BTC", "Bitcoin", 1.0),
            PricedEntity::new("btc", "Bitcoin Clone", 2.0),
        ]);

        assert_eq!(store.len(), 1);
        assert_eq!(store.entities()[0].price, 1.0);
    }

    #[test]
    fn test_load_is_idempotent() {
        let mut store = DatasetStore::new();
        store.load(sample());
        let before = store.select("coin", Some((SortKey::Price, SortDirection::Descending)));

        store.load(sample());
        let after = store.select("coin", Some((SortKey::Price, SortDirection::Descending)));
        assert_eq!(before, after);
    }

    #[test]
    fn test_select_filters_before_sorting() {
        let mut store = DatasetStore::new();
        store.load(sample());

        let view = store.select("coin", Some((SortKey::Price, SortDirection::Ascending)));
        assert_eq!(symbols(&view), vec!["DOGE", "BTC"]);
    }

    #[test]
    fn test_sort_key_parsing() {
        assert_eq!("market-cap".parse::<SortKey>().unwrap(), SortKey::MarketCap);
        assert_eq!("Price".parse::<SortKey>().unwrap(), SortKey::Price);
        assert!("volume".parse::<SortKey>().is_err());
    }
}
