//! Chat queries over 2024 tech-stock prices
//!
//! This crate turns a free-form chat message about a technology stock into a
//! reply:
//!
//! - Query interpretation: ticker, date range and request kind, via the
//!   remote model with a keyword-table fallback ([`query`])
//! - Price series access over SQLite or memory ([`store`])
//! - Summary statistics and their chat rendering ([`stats`])
//! - Short commentary from the remote model, a second model, or fixed
//!   thresholds ([`analysis`])
//! - Chart data and the chat pipeline tying it together ([`chart`], [`bot`])
//!
//! Every remote step has a deterministic counterpart. Without an API key the
//! whole pipeline runs offline.
//!
//! # Example
//!
//! ```rust,ignore
//! use stockchat::{BotConfig, StockBot};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let bot = StockBot::from_config(&BotConfig::from_env()?)?;
//!
//!     for reply in bot.handle("Анализ Циско в период с апреля по август").await {
//!         println!("{}", reply.as_text());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod bot;
pub mod chart;
pub mod config;
pub mod error;
pub mod prompts;
pub mod query;
pub mod stats;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export main types for convenience
pub use analysis::{AnalysisGenerator, format_ai_response, narrate};
pub use bot::{BotReply, Command, StockBot};
pub use chart::ChartData;
pub use config::{BotConfig, ModelConfig};
pub use error::{Result, StockError};
pub use query::{ParsedQuery, QueryParser, RequestType, parse_rules};
pub use stats::{StockStatistics, Trend, compute, format_stats_message};
pub use store::{InMemoryPriceStore, PriceRecord, PriceSeriesStore, SqlitePriceStore};
