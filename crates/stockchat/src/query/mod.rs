//! Natural-language query classification
//!
//! A chat message is reduced to a [`ParsedQuery`]: which ticker, which date
//! range, and what kind of answer the user wants. [`parse_rules`] does this
//! with fixed keyword tables; [`QueryParser`] asks the remote model first and
//! merges its answer field by field with the rule-based result.

pub mod ai;
pub mod rules;

pub use ai::QueryParser;
pub use rules::{SUPPORTED_COMPANIES, parse_rules};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Calendar year covered by the price data
pub const DATA_YEAR: i32 = 2024;

pub(crate) const fn date(month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(DATA_YEAR, month, day) {
        Some(date) => date,
        None => panic!("invalid calendar date"),
    }
}

/// First and last day of [`DATA_YEAR`]
pub const FULL_YEAR: (NaiveDate, NaiveDate) = (date(1, 1), date(12, 31));

/// Kind of answer requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    Graph,
    Stats,
    Analysis,
    Unknown,
}

impl RequestType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Graph => "graph",
            Self::Stats => "stats",
            Self::Analysis => "analysis",
            Self::Unknown => "unknown",
        }
    }

    /// Parse a wire name, case-insensitively
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "graph" => Some(Self::Graph),
            "stats" => Some(Self::Stats),
            "analysis" => Some(Self::Analysis),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured form of a chat message
///
/// `start_date <= end_date` holds for every value produced by the parsers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedQuery {
    pub ticker: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub request_type: RequestType,
}
