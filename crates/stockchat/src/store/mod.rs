//! Read-only access to daily price series
//!
//! A [`PriceSeriesStore`] answers one question: the ordered daily records of a
//! ticker within an inclusive date range. Populating the backing store is the
//! job of an external loader.

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryPriceStore;
pub use sqlite::SqlitePriceStore;

use crate::error::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day of OHLCV data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceRecord {
    /// Record where open, high, low and close share one price
    pub fn flat(date: NaiveDate, price: f64, volume: u64) -> Self {
        Self {
            date,
            open: price,
            high: price,
            low: price,
            close: price,
            volume,
        }
    }
}

/// Source of price series
///
/// Implementations must return records sorted ascending by date with no
/// duplicate dates, and an empty vector (not an error) when nothing matches.
/// Calls may happen concurrently from independent requests.
pub trait PriceSeriesStore: Send + Sync {
    /// Fetch records for `ticker` with `start <= date <= end`
    ///
    /// The ticker is matched exactly as stored.
    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<PriceRecord>>;
}
