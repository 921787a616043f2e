//! Session-scoped conversion history with CSV export.

use crate::convert::Conversion;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

pub const DEFAULT_CAPACITY: usize = 50;

#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub conversion: Conversion,
}

/// Newest-first record of conversions performed in this run. Capped: once the
/// capacity is reached the oldest entries fall off.
#[derive(Debug)]
pub struct ConversionHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl ConversionHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ConversionHistory {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, conversion: Conversion) {
        self.entries.push_front(HistoryEntry {
            timestamp: Utc::now(),
            conversion,
        });
        self.entries.truncate(self.capacity);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Renders the history as CSV, newest entry first.
    pub fn to_csv(&self) -> String {
        let mut out = String::from(
            "Date,Amount,From Currency,Converted Amount,To Currency,Exchange Rate\n",
        );
        for entry in &self.entries {
            let c = &entry.conversion;
            out.push_str(&format!(
                "{},{},{},{},{},{}\n",
                entry.timestamp.to_rfc3339(),
                c.amount,
                c.from,
                c.converted,
                c.to,
                c.rate_used
            ));
        }
        out
    }
}

impl Default for ConversionHistory {
    fn default() -> Self {
        Self::new()
    }
}
