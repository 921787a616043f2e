//! Currency conversion over one base-relative rate table.

use crate::rates::{RateSnapshot, RateSource, RateTable, demo_rates};
use anyhow::Result;
use chrono::Utc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, PartialEq)]
pub enum ConvertError {
    /// Conversion amounts must be finite and greater than zero.
    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),
}

/// Outcome of a single conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub amount: f64,
    pub from: String,
    pub to: String,
    pub converted: f64,
    pub rate_used: f64,
}

/// Pure conversion math plus one mutable slot for the current rate table.
///
/// The converter never fetches anything itself: the caller feeds it fetch
/// results through [`RateConverter::load_rates`], and a failed fetch degrades
/// to the hardcoded demo table with [`RateSource::Demo`] set so the output
/// layer can warn the user.
#[derive(Debug, Clone)]
pub struct RateConverter {
    snapshot: RateSnapshot,
}

impl RateConverter {
    /// Starts on the demo table; callers are expected to `load_rates` before
    /// presenting anything as live.
    pub fn new(base_currency: &str) -> Self {
        RateConverter {
            snapshot: RateSnapshot {
                base: base_currency.to_uppercase(),
                rates: demo_rates(),
                source: RateSource::Demo,
                fetched_at: Utc::now(),
            },
        }
    }

    pub fn base_currency(&self) -> &str {
        &self.snapshot.base
    }

    pub fn source(&self) -> RateSource {
        self.snapshot.source
    }

    pub fn is_demo(&self) -> bool {
        self.snapshot.source == RateSource::Demo
    }

    pub fn snapshot(&self) -> &RateSnapshot {
        &self.snapshot
    }

    /// Replaces the rate table with a fetch result. On failure the demo table
    /// is installed and the snapshot flagged as demo, so conversions stay
    /// available and the staleness is visible to the caller. Loading the same
    /// table twice is a no-op apart from the refresh timestamp.
    pub fn load_rates(&mut self, fetched: Result<RateTable>) {
        match fetched {
            Ok(rates) => {
                debug!(count = rates.len(), base = %self.snapshot.base, "Loaded live rates");
                self.snapshot.rates = rates;
                self.snapshot.source = RateSource::Live;
            }
            Err(e) => {
                warn!(error = %e, "Rate fetch failed, falling back to demo rates");
                self.snapshot.rates = demo_rates();
                self.snapshot.source = RateSource::Demo;
            }
        }
        self.snapshot.fetched_at = Utc::now();
    }

    /// Switches the base currency. Rates are only meaningful against one
    /// base, so this requires a fresh fetch result for the new base.
    pub fn set_base_currency(&mut self, base_currency: &str, fetched: Result<RateTable>) {
        self.snapshot.base = base_currency.to_uppercase();
        self.load_rates(fetched);
    }

    /// Conversion rate from one currency to another.
    ///
    /// Same-currency conversions short-circuit to exactly 1.0 before any
    /// table lookup. When neither endpoint is the base the result is a
    /// cross-rate derived through the base, an approximation rather than a
    /// quoted market rate. Codes missing from the table count as 1.0 so a
    /// lookup can never fail; the substitution is lossy by design.
    pub fn rate(&self, from: &str, to: &str) -> f64 {
        let from = from.to_uppercase();
        let to = to.to_uppercase();
        if from == to {
            return 1.0;
        }
        if from == self.snapshot.base {
            self.lookup(&to)
        } else if to == self.snapshot.base {
            1.0 / self.lookup(&from)
        } else {
            self.lookup(&to) / self.lookup(&from)
        }
    }

    /// Converts `amount` between two currencies. Rejects non-finite, zero and
    /// negative amounts rather than converting them silently.
    pub fn convert(&self, amount: f64, from: &str, to: &str) -> Result<Conversion, ConvertError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(ConvertError::InvalidAmount(amount));
        }
        let rate_used = self.rate(from, to);
        Ok(Conversion {
            amount,
            from: from.to_uppercase(),
            to: to.to_uppercase(),
            converted: amount * rate_used,
            rate_used,
        })
    }

    fn lookup(&self, code: &str) -> f64 {
        match self.snapshot.rates.get(code) {
            Some(rate) => *rate,
            None => {
                debug!(code, "Unknown currency code, substituting rate 1.0");
                1.0
            }
        }
    }
}
