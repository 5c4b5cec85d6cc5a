//! In-memory price store

use super::{PriceRecord, PriceSeriesStore};
use crate::error::Result;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

/// Price store backed by per-ticker ordered maps
#[derive(Debug, Clone, Default)]
pub struct InMemoryPriceStore {
    series: HashMap<String, BTreeMap<NaiveDate, PriceRecord>>,
}

impl InMemoryPriceStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record; a later record for the same date replaces the earlier one
    pub fn insert(&mut self, ticker: impl Into<String>, record: PriceRecord) {
        self.series
            .entry(ticker.into())
            .or_default()
            .insert(record.date, record);
    }

    /// Builder-style bulk insert
    pub fn with_series(
        mut self,
        ticker: impl Into<String>,
        records: impl IntoIterator<Item = PriceRecord>,
    ) -> Self {
        let ticker = ticker.into();
        for record in records {
            self.insert(ticker.clone(), record);
        }
        self
    }

    /// Tickers with at least one record
    pub fn tickers(&self) -> Vec<&str> {
        let mut tickers: Vec<&str> = self.series.keys().map(String::as_str).collect();
        tickers.sort_unstable();
        tickers
    }
}

impl PriceSeriesStore for InMemoryPriceStore {
    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<PriceRecord>> {
        if start > end {
            return Ok(Vec::new());
        }

        Ok(self
            .series
            .get(ticker)
            .map(|days| days.range(start..=end).map(|(_, record)| *record).collect())
            .unwrap_or_default())
    }
}
