//! Closing-price chart data
//!
//! The pipeline only prepares the points and the caption. Drawing is left to
//! whatever transport shows the reply.

use crate::error::{Result, StockError};
use crate::store::{PriceRecord, PriceSeriesStore};
use chrono::NaiveDate;
use serde::Serialize;

/// Reply when a chart period holds no prices
pub const NO_CHART_DATA_MESSAGE: &str = "❌ Данные не найдены для указанного периода";

/// Points of a closing-price line chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub ticker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub points: Vec<(NaiveDate, f64)>,
}

impl ChartData {
    /// Build from a series; empty series yield [`StockError::NoData`]
    pub fn from_series(
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        series: &[PriceRecord],
    ) -> Result<Self> {
        if series.is_empty() {
            return Err(StockError::NoData);
        }

        Ok(Self {
            ticker: ticker.to_string(),
            start_date,
            end_date,
            points: series.iter().map(|r| (r.date, r.close)).collect(),
        })
    }

    /// Fetch the series from `store` and build the chart
    pub fn load(
        store: &dyn PriceSeriesStore,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Self> {
        let series = store.fetch(ticker, start_date, end_date)?;
        Self::from_series(ticker, start_date, end_date, &series)
    }

    /// Caption shown under the chart; uses the requested period
    pub fn caption(&self) -> String {
        format!(
            "📈 График {} за период {} - {}",
            self.ticker, self.start_date, self.end_date
        )
    }

    /// Lowest and highest close
    pub fn close_range(&self) -> Option<(f64, f64)> {
        self.points.iter().map(|(_, close)| *close).fold(None, |range, close| {
            Some(match range {
                None => (close, close),
                Some((lo, hi)) => (lo.min(close), hi.max(close)),
            })
        })
    }
}
