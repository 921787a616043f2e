//! Exchange-rate types, the fetch abstraction, and the demo fallback table.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Rates keyed by currency code, each expressed as a multiplier relative to
/// one base currency. The base itself is implicitly 1.0 and may be absent.
pub type RateTable = HashMap<String, f64>;

/// Where the current rate table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateSource {
    /// Fetched from the live API.
    Live,
    /// Hardcoded fallback values, used when the live source is unreachable.
    /// Never to be presented as live rates.
    Demo,
}

/// One rate table together with its base and fetch time.
#[derive(Debug, Clone)]
pub struct RateSnapshot {
    pub base: String,
    pub rates: RateTable,
    pub source: RateSource,
    pub fetched_at: DateTime<Utc>,
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetches the latest rate table expressed against `base`.
    async fn fetch_rates(&self, base: &str) -> Result<RateTable>;
}

/// Approximate USD-relative rates used when the live source is down.
/// Demo data only; values are deliberately round and out of date.
pub fn demo_rates() -> RateTable {
    [
        ("EUR", 0.85),
        ("GBP", 0.73),
        ("JPY", 110.0),
        ("AUD", 1.35),
        ("CAD", 1.25),
        ("CHF", 0.92),
        ("CNY", 6.45),
        ("INR", 74.5),
        ("KRW", 1180.0),
        ("MXN", 20.5),
        ("RUB", 73.5),
        ("ZAR", 14.8),
        ("BRL", 5.2),
        ("SGD", 1.35),
        ("NZD", 1.42),
        ("HKD", 7.8),
        ("SEK", 8.6),
        ("NOK", 8.9),
        ("TRY", 8.5),
        ("PLN", 3.9),
        ("DKK", 6.2),
        ("CZK", 21.5),
        ("HUF", 295.0),
        ("ILS", 3.2),
        ("CLP", 720.0),
        ("PHP", 50.0),
        ("AED", 3.67),
        ("SAR", 3.75),
        ("EGP", 15.7),
        ("THB", 31.0),
        ("VND", 23000.0),
        ("MYR", 4.1),
        ("IDR", 14200.0),
    ]
    .into_iter()
    .map(|(code, rate)| (code.to_string(), rate))
    .collect()
}

/// Supported currency codes with human-readable names, for rate listings and
/// conversion output. Display chrome (flags, currency symbols) is the
/// renderer's business and lives elsewhere.
pub const CURRENCIES: &[(&str, &str)] = &[
    ("USD", "US Dollar"),
    ("EUR", "Euro"),
    ("GBP", "British Pound"),
    ("JPY", "Japanese Yen"),
    ("AUD", "Australian Dollar"),
    ("CAD", "Canadian Dollar"),
    ("CHF", "Swiss Franc"),
    ("CNY", "Chinese Yuan"),
    ("INR", "Indian Rupee"),
    ("KRW", "South Korean Won"),
    ("MXN", "Mexican Peso"),
    ("RUB", "Russian Ruble"),
    ("ZAR", "South African Rand"),
    ("BRL", "Brazilian Real"),
    ("SGD", "Singapore Dollar"),
    ("NZD", "New Zealand Dollar"),
    ("HKD", "Hong Kong Dollar"),
    ("SEK", "Swedish Krona"),
    ("NOK", "Norwegian Krone"),
    ("TRY", "Turkish Lira"),
    ("PLN", "Polish Zloty"),
    ("DKK", "Danish Krone"),
    ("CZK", "Czech Koruna"),
    ("HUF", "Hungarian Forint"),
    ("ILS", "Israeli Shekel"),
    ("CLP", "Chilean Peso"),
    ("PHP", "Philippine Peso"),
    ("AED", "UAE Dirham"),
    ("SAR", "Saudi Riyal"),
    ("EGP", "Egyptian Pound"),
    ("THB", "Thai Baht"),
    ("VND", "Vietnamese Dong"),
    ("MYR", "Malaysian Ringgit"),
    ("IDR", "Indonesian Rupiah"),
];

/// Human-readable name for a currency code, falling back to the code itself.
pub fn currency_name(code: &str) -> &str {
    CURRENCIES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
        .unwrap_or(code)
}
