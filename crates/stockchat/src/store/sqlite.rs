//! SQLite-backed price store
//!
//! Reads the `stock_prices` table written by the data loader:
//! `(Ticker, Date, Open, High, Low, Close, Volume)` with ISO dates stored as
//! text. A fresh read-only connection is opened per call, so concurrent
//! requests never share connection state.

use super::{PriceRecord, PriceSeriesStore};
use crate::error::{Result, StockError};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags, Row, params};
use std::path::PathBuf;
use tracing::debug;

// Compare calendar days so timestamped rows still match an inclusive end date.
const SERIES_QUERY: &str = "SELECT Date, Open, High, Low, Close, Volume
     FROM stock_prices
     WHERE Ticker = ?1 AND substr(Date, 1, 10) BETWEEN ?2 AND ?3
     ORDER BY Date";

/// Price store reading a SQLite database file
#[derive(Debug, Clone)]
pub struct SqlitePriceStore {
    path: PathBuf,
}

impl SqlitePriceStore {
    /// Create a store for the database at `path`
    ///
    /// The file is not opened until the first fetch.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn open(&self) -> Result<Connection> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        Ok(Connection::open_with_flags(&self.path, flags)?)
    }
}

impl PriceSeriesStore for SqlitePriceStore {
    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<PriceRecord>> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(SERIES_QUERY)?;

        let start = start.format("%Y-%m-%d").to_string();
        let end = end.format("%Y-%m-%d").to_string();

        let rows = stmt.query_map(params![ticker, start, end], read_record)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row??);
        }
        records.dedup_by_key(|record| record.date);

        debug!(ticker, rows = records.len(), "Fetched price series");
        Ok(records)
    }
}

fn read_record(row: &Row<'_>) -> rusqlite::Result<Result<PriceRecord>> {
    let date: String = row.get(0)?;
    let volume: Value = row.get(5)?;

    let record = parse_date(&date).and_then(|date| {
        Ok(PriceRecord {
            date,
            open: row.get(1)?,
            high: row.get(2)?,
            low: row.get(3)?,
            close: row.get(4)?,
            volume: parse_volume(volume)?,
        })
    });

    Ok(record)
}

// Loaders write either `2024-03-01` or `2024-03-01 00:00:00`.
fn parse_date(raw: &str) -> Result<NaiveDate> {
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| StockError::Other(format!("Invalid date '{raw}' in stock_prices: {e}")))
}

fn parse_volume(value: Value) -> Result<u64> {
    match value {
        Value::Integer(v) if v >= 0 => Ok(v as u64),
        Value::Real(v) if v >= 0.0 && v.is_finite() => Ok(v.round() as u64),
        Value::Null => Ok(0),
        other => Err(StockError::Other(format!("Invalid volume in stock_prices: {other:?}"))),
    }
}
