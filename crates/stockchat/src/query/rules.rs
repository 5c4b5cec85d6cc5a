//! Keyword-table query parser
//!
//! Every table is an ordered list scanned first-match-wins against the
//! lowercased message. The tables are Russian stems plus English company
//! names, matching how users of the bot write.

use super::{FULL_YEAR, ParsedQuery, RequestType, date};
use chrono::NaiveDate;

/// Company name variants and their tickers, in match order
pub const COMPANIES: &[(&str, &str)] = &[
    ("apple", "AAPL"),
    ("эпл", "AAPL"),
    ("microsoft", "MSFT"),
    ("майкрософт", "MSFT"),
    ("google", "GOOGL"),
    ("гугл", "GOOGL"),
    ("nvidia", "NVDA"),
    ("нвидиа", "NVDA"),
    ("amd", "AMD"),
    ("амд", "AMD"),
    ("adobe", "ADBE"),
    ("адоб", "ADBE"),
    ("cisco", "CSCO"),
    ("циско", "CSCO"),
    ("salesforce", "CRM"),
    ("uber", "UBER"),
    ("убер", "UBER"),
    ("zoom", "ZM"),
    ("зум", "ZM"),
    ("logitech", "LOGI"),
    ("лоджитек", "LOGI"),
    ("philips", "PHG"),
    ("филипс", "PHG"),
    ("zi", "ZI"),
];

/// Human-readable list of the companies in [`COMPANIES`]
pub const SUPPORTED_COMPANIES: &str =
    "Apple, Microsoft, Google, NVIDIA, AMD, Adobe, Cisco, Salesforce, Uber, Zoom, Logitech, Philips, ZI";

const MONTHS: &[(&str, NaiveDate, NaiveDate)] = &[
    ("январ", date(1, 1), date(1, 31)),
    ("феврал", date(2, 1), date(2, 29)),
    ("март", date(3, 1), date(3, 31)),
    ("апрел", date(4, 1), date(4, 30)),
    ("май", date(5, 1), date(5, 31)),
    ("июн", date(6, 1), date(6, 30)),
    ("июл", date(7, 1), date(7, 31)),
    ("август", date(8, 1), date(8, 31)),
    ("сентябр", date(9, 1), date(9, 30)),
    ("октябр", date(10, 1), date(10, 31)),
    ("ноябр", date(11, 1), date(11, 30)),
    ("декабр", date(12, 1), date(12, 31)),
];

/// Secondary period phrases: every stem in the group must appear
const PERIODS: &[(&[&str], NaiveDate, NaiveDate)] = &[
    (&["перв", "полугоди"], date(1, 1), date(6, 30)),
    (&["втор", "полугоди"], date(7, 1), date(12, 31)),
    (&["1 квартал"], date(1, 1), date(3, 31)),
    (&["первый квартал"], date(1, 1), date(3, 31)),
    (&["2 квартал"], date(4, 1), date(6, 30)),
    (&["второй квартал"], date(4, 1), date(6, 30)),
];

const REQUEST_TYPES: &[(&[&str], RequestType)] = &[
    (&["график", "покажи"], RequestType::Graph),
    (&["анализ", "аналитика"], RequestType::Analysis),
    (&["статистик"], RequestType::Stats),
];

/// Classify a message with the keyword tables
///
/// Total and deterministic: any input yields a query, with the full data
/// year as the period when no period phrase matches.
pub fn parse_rules(text: &str) -> ParsedQuery {
    let lower = text.to_lowercase();
    let (start_date, end_date) = match_period(&lower);

    ParsedQuery {
        ticker: match_ticker(&lower).map(str::to_string),
        start_date,
        end_date,
        request_type: match_request_type(&lower),
    }
}

fn match_ticker(lower: &str) -> Option<&'static str> {
    COMPANIES
        .iter()
        .find(|(name, _)| lower.contains(name))
        .map(|(_, ticker)| *ticker)
}

fn match_period(lower: &str) -> (NaiveDate, NaiveDate) {
    if let Some((_, start, end)) = MONTHS.iter().find(|(stem, _, _)| lower.contains(stem)) {
        return (*start, *end);
    }

    PERIODS
        .iter()
        .find(|(stems, _, _)| stems.iter().all(|stem| lower.contains(stem)))
        .map_or(FULL_YEAR, |(_, start, end)| (*start, *end))
}

fn match_request_type(lower: &str) -> RequestType {
    REQUEST_TYPES
        .iter()
        .find(|(words, _)| words.iter().any(|word| lower.contains(word)))
        .map_or(RequestType::Unknown, |(_, kind)| *kind)
}
