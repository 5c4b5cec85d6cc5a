//! Summary statistics over a price series

use crate::error::{Result, StockError};
use crate::store::PriceRecord;
use chrono::NaiveDate;
use serde::Serialize;

/// Snapshot of one price series
///
/// Prices are closing prices. `days_count` is always at least one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockStatistics {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub start_price: f64,
    pub end_price: f64,
    pub price_change: f64,
    pub price_change_percent: f64,
    pub average_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    /// Sample standard deviation of closing prices; zero for a single day
    pub volatility: f64,
    pub total_volume: u64,
    pub days_count: usize,
}

impl StockStatistics {
    /// Mean daily volume
    pub fn average_volume(&self) -> f64 {
        self.total_volume as f64 / self.days_count as f64
    }

    /// Direction of the net price change
    pub fn trend(&self) -> Trend {
        Trend::from_change(self.price_change)
    }
}

/// Sign of a net price change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn from_change(change: f64) -> Self {
        if change > 0.0 {
            Self::Up
        } else if change < 0.0 {
            Self::Down
        } else {
            Self::Flat
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Flat => "flat",
        }
    }
}

/// Compute statistics for an ordered series
///
/// Returns [`StockError::NoData`] for an empty series and
/// [`StockError::Computation`] when the first close is zero or not finite.
pub fn compute(series: &[PriceRecord]) -> Result<StockStatistics> {
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return Err(StockError::NoData);
    };

    let start_price = first.close;
    let end_price = last.close;
    if start_price == 0.0 || !start_price.is_finite() {
        return Err(StockError::Computation(format!(
            "cannot compute percent change from start price {start_price}"
        )));
    }

    let price_change = end_price - start_price;
    let n = series.len() as f64;

    let closes = series.iter().map(|r| r.close);
    let average_price = closes.clone().sum::<f64>() / n;
    let min_price = closes.clone().fold(f64::INFINITY, f64::min);
    let max_price = closes.clone().fold(f64::NEG_INFINITY, f64::max);

    let volatility = if series.len() > 1 {
        let squared: f64 = closes.map(|c| (c - average_price).powi(2)).sum();
        (squared / (n - 1.0)).sqrt()
    } else {
        0.0
    };

    Ok(StockStatistics {
        period_start: first.date,
        period_end: last.date,
        start_price,
        end_price,
        price_change,
        price_change_percent: price_change / start_price * 100.0,
        average_price,
        min_price,
        max_price,
        volatility,
        total_volume: series.iter().map(|r| r.volume).sum(),
        days_count: series.len(),
    })
}

/// Render the chat message for a statistics reply
pub fn format_stats_message(stats: &StockStatistics, ticker: &str) -> String {
    let mut message = format!("📊 Статистика {ticker}\n\n");
    message.push_str(&format!(
        "Период: {} - {}\n",
        stats.period_start, stats.period_end
    ));
    message.push_str(&format!(
        "Изменение цены: ${:.2} ({:.1}%)\n",
        stats.price_change, stats.price_change_percent
    ));
    message.push_str(&format!("Начальная цена: ${:.2}\n", stats.start_price));
    message.push_str(&format!("Конечная цена: ${:.2}\n", stats.end_price));
    message.push_str(&format!("Минимум: ${:.2}\n", stats.min_price));
    message.push_str(&format!("Максимум: ${:.2}\n", stats.max_price));
    message.push_str(&format!("Средняя цена: ${:.2}\n", stats.average_price));
    message.push_str(&format!("Волатильность: ${:.2}\n", stats.volatility));
    message.push_str(&format!(
        "Общий объем: {}\n",
        format_thousands(stats.total_volume)
    ));
    message.push_str(&format!("Торговых дней: {}", stats.days_count));

    message.push_str(match stats.trend() {
        Trend::Up => "\n\n📈 Тренд: РОСТ 🟢",
        Trend::Down => "\n\n📉 Тренд: ПАДЕНИЕ 🔴",
        Trend::Flat => "\n\n➡️ Тренд: СТАБИЛЬНЫЙ ⚪",
    });

    message
}

/// Group digits in threes with commas: `1234567` → `1,234,567`
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(closes: &[f64]) -> Vec<PriceRecord> {
        closes
            .iter()
            .enumerate()
            .map(|(i, close)| {
                let date = NaiveDate::from_ymd_opt(2024, 1, 2 + i as u32).unwrap();
                PriceRecord::flat(date, *close, 1_000)
            })
            .collect()
    }

    #[test]
    fn test_two_day_rise() {
        let stats = compute(&series(&[100.0, 110.0])).unwrap();

        assert_eq!(stats.days_count, 2);
        assert_eq!(stats.price_change, 10.0);
        assert!((stats.price_change_percent - 10.0).abs() < 1e-9);
        assert_eq!(stats.trend(), Trend::Up);
        assert_eq!(stats.average_price, 105.0);
        assert_eq!(stats.min_price, 100.0);
        assert_eq!(stats.max_price, 110.0);
        assert!((stats.volatility - 50f64.sqrt()).abs() < 1e-9);
        assert_eq!(stats.total_volume, 2_000);
    }

    #[test]
    fn test_empty_series_is_no_data() {
        assert!(matches!(compute(&[]), Err(StockError::NoData)));
    }

    #[test]
    fn test_zero_start_price_is_computation_error() {
        let result = compute(&series(&[0.0, 5.0]));
        assert!(matches!(result, Err(StockError::Computation(_))));
    }

    #[test]
    fn test_single_day_has_zero_volatility() {
        let stats = compute(&series(&[42.0])).unwrap();
        assert_eq!(stats.volatility, 0.0);
        assert_eq!(stats.trend(), Trend::Flat);
        assert_eq!(stats.period_start, stats.period_end);
    }

    #[test]
    fn test_falling_trend() {
        let stats = compute(&series(&[50.0, 45.0, 40.0])).unwrap();
        assert_eq!(stats.trend(), Trend::Down);
        assert!((stats.price_change_percent + 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1_000), "1,000");
        assert_eq!(format_thousands(1_234_567), "1,234,567");
        assert_eq!(format_thousands(12_345_678), "12,345,678");
    }

    #[test]
    fn test_format_stats_message() {
        let stats = compute(&series(&[100.0, 110.0])).unwrap();
        let message = format_stats_message(&stats, "AAPL");

        assert!(message.starts_with("📊 Статистика AAPL\n\n"));
        assert!(message.contains("Период: 2024-01-02 - 2024-01-03\n"));
        assert!(message.contains("Изменение цены: $10.00 (10.0%)\n"));
        assert!(message.contains("Общий объем: 2,000\n"));
        assert!(message.contains("Торговых дней: 2"));
        assert!(message.ends_with("\n\n📈 Тренд: РОСТ 🟢"));
    }

    #[test]
    fn test_format_stats_message_full_text() {
        let stats = compute(&series(&[50.0, 40.0])).unwrap();

        assert_eq!(
            format_stats_message(&stats, "MSFT"),
            "📊 Статистика MSFT\n\n\
             Период: 2024-01-02 - 2024-01-03\n\
             Изменение цены: $-10.00 (-20.0%)\n\
             Начальная цена: $50.00\n\
             Конечная цена: $40.00\n\
             Минимум: $40.00\n\
             Максимум: $50.00\n\
             Средняя цена: $45.00\n\
             Волатильность: $7.07\n\
             Общий объем: 2,000\n\
             Торговых дней: 2\n\n\
             📉 Тренд: ПАДЕНИЕ 🔴"
        );
    }

    #[test]
    fn test_trend_labels() {
        assert_eq!(Trend::from_change(0.0), Trend::Flat);
        assert_eq!(Trend::from_change(-0.01).as_str(), "down");
        assert_eq!(Trend::from_change(3.0).as_str(), "up");
    }
}
