//! Property tests for the deterministic components

use chrono::NaiveDate;
use proptest::prelude::*;
use stockchat::query::FULL_YEAR;
use stockchat::{PriceRecord, QueryParser, StockError, compute, parse_rules};

fn series_strategy() -> impl Strategy<Value = Vec<PriceRecord>> {
    prop::collection::vec((1.0f64..5_000.0, 0u64..500_000_000), 1..60).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (close, volume))| {
                let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Days::new(i as u64);
                PriceRecord::flat(date, close, volume)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn rule_parser_is_total(text in any::<String>()) {
        let query = parse_rules(&text);
        prop_assert!(query.start_date <= query.end_date);
        prop_assert!(query.start_date >= FULL_YEAR.0);
        prop_assert!(query.end_date <= FULL_YEAR.1);
        prop_assert_eq!(parse_rules(&text), query);
    }

    #[test]
    fn rule_parser_handles_cyrillic_noise(text in "[а-яА-Я0-9 ]{0,40}") {
        let query = parse_rules(&text);
        prop_assert!(query.start_date <= query.end_date);
    }

    #[test]
    fn parser_without_credential_equals_rules(text in "\\PC{0,60}") {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let parsed = runtime.block_on(QueryParser::rule_based().parse(&text));
        prop_assert_eq!(parsed, parse_rules(&text));
    }

    #[test]
    fn statistics_invariants(series in series_strategy()) {
        let stats = compute(&series).unwrap();
        let first = series.first().unwrap();
        let last = series.last().unwrap();

        prop_assert_eq!(stats.days_count, series.len());
        prop_assert_eq!(stats.price_change, last.close - first.close);
        prop_assert_eq!(stats.period_start, first.date);
        prop_assert_eq!(stats.period_end, last.date);
        prop_assert_eq!(stats.total_volume, series.iter().map(|r| r.volume).sum::<u64>());
        prop_assert!(stats.min_price <= stats.average_price + 1e-9);
        prop_assert!(stats.average_price <= stats.max_price + 1e-9);
        prop_assert!(stats.volatility >= 0.0);
        prop_assert!(stats.price_change_percent.is_finite());
    }
}

#[test]
fn empty_series_is_not_found() {
    assert!(matches!(compute(&[]), Err(StockError::NoData)));
}
