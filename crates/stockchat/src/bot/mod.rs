//! Chat pipeline
//!
//! [`StockBot`] turns one line of user input into the replies a chat
//! transport should send, in order. Every failure is folded into a reply
//! starting with `❌`; nothing is returned as an error.
//!
//! # Example
//!
//! ```rust,ignore
//! use stockchat::{BotConfig, StockBot};
//!
//! let bot = StockBot::from_config(&BotConfig::from_env()?)?;
//! for reply in bot.handle("Статистика NVIDIA за первое полугодие").await {
//!     println!("{}", reply.as_text());
//! }
//! ```

pub mod commands;

pub use commands::{Command, HELP_TEXT, START_TEXT};

use crate::analysis::AnalysisGenerator;
use crate::chart::{ChartData, NO_CHART_DATA_MESSAGE};
use crate::config::{BotConfig, ModelConfig};
use crate::error::{Result, StockError};
use crate::query::{ParsedQuery, QueryParser, RequestType, SUPPORTED_COMPANIES};
use crate::stats::{compute, format_stats_message};
use crate::store::{PriceSeriesStore, SqlitePriceStore};
use std::sync::Arc;
use tracing::{info, warn};

/// Reply when a stats period holds no prices
pub const NO_DATA_MESSAGE: &str = "❌ Данные не найдены";

/// Progress line sent before a chart
pub const CHART_PROGRESS: &str = "Строю график...";

/// Progress line sent before an analysis
pub const ANALYSIS_PROGRESS: &str = "🧠 Генерирую AI-аналитику...";

/// One message to send back
#[derive(Debug, Clone, PartialEq)]
pub enum BotReply {
    /// Plain text
    Text(String),
    /// Closing-price chart with its caption
    Chart { data: ChartData, caption: String },
}

impl BotReply {
    fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Text shown to the user: the message itself or the chart caption
    pub fn as_text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Chart { caption, .. } => caption,
        }
    }
}

/// Stock chat bot
#[derive(Clone)]
pub struct StockBot {
    store: Arc<dyn PriceSeriesStore>,
    parser: QueryParser,
    generator: AnalysisGenerator,
}

impl StockBot {
    /// Assemble a bot from its parts
    pub fn new(
        store: Arc<dyn PriceSeriesStore>,
        parser: QueryParser,
        generator: AnalysisGenerator,
    ) -> Self {
        Self {
            store,
            parser,
            generator,
        }
    }

    /// Bot over `store`, with one provider shared by parser and generator
    pub fn with_store(store: Arc<dyn PriceSeriesStore>, models: &ModelConfig) -> Result<Self> {
        let provider = models.provider()?;
        let parser = QueryParser::new(provider.clone(), models.primary_model.clone());
        let generator = AnalysisGenerator::new(store.clone(), provider, models);
        Ok(Self::new(store, parser, generator))
    }

    /// Bot over the SQLite database named in `config`
    pub fn from_config(config: &BotConfig) -> Result<Self> {
        let store = Arc::new(SqlitePriceStore::new(&config.database_path));
        info!(
            database = %config.database_path.display(),
            remote = config.models.has_credential(),
            "Starting stock bot"
        );
        Self::with_store(store, &config.models)
    }

    /// Replies for one line of input
    pub async fn handle(&self, input: &str) -> Vec<BotReply> {
        match Command::parse(input) {
            Ok(command) => self.execute(command).await,
            Err(StockError::CommandError(reason)) => vec![BotReply::text(format!("❌ {reason}"))],
            Err(err) => vec![BotReply::text(format!("❌ {err}"))],
        }
    }

    /// Replies for a parsed command
    pub async fn execute(&self, command: Command) -> Vec<BotReply> {
        match command {
            Command::Start => vec![BotReply::text(START_TEXT)],
            Command::Help => vec![BotReply::text(HELP_TEXT)],
            Command::Exit => Vec::new(),
            Command::Query { text } => self.answer(&text).await,
        }
    }

    async fn answer(&self, text: &str) -> Vec<BotReply> {
        let query = self.parser.parse(text).await;
        info!(
            ticker = query.ticker.as_deref().unwrap_or("-"),
            start = %query.start_date,
            end = %query.end_date,
            request_type = %query.request_type,
            "Parsed query"
        );

        let Some(ticker) = query.ticker.as_deref() else {
            return vec![BotReply::text(format!(
                "{}❌ Укажи компанию: {SUPPORTED_COMPANIES}",
                query_summary(&query)
            ))];
        };

        match query.request_type {
            RequestType::Graph => vec![BotReply::text(CHART_PROGRESS), self.chart(ticker, &query)],
            RequestType::Analysis => {
                let stats_text = match self.stats_reply(ticker, &query) {
                    Ok(text) => text,
                    Err(failure) => return vec![BotReply::text(failure)],
                };

                let analysis = self
                    .generator
                    .generate(ticker, query.start_date, query.end_date)
                    .await;
                vec![
                    BotReply::text(stats_text),
                    BotReply::text(ANALYSIS_PROGRESS),
                    BotReply::text(analysis),
                ]
            }
            RequestType::Stats | RequestType::Unknown => {
                let reply = match self.stats_reply(ticker, &query) {
                    Ok(text) | Err(text) => text,
                };
                vec![BotReply::text(reply)]
            }
        }
    }

    fn chart(&self, ticker: &str, query: &ParsedQuery) -> BotReply {
        match ChartData::load(self.store.as_ref(), ticker, query.start_date, query.end_date) {
            Ok(data) => BotReply::Chart {
                caption: data.caption(),
                data,
            },
            Err(StockError::NoData) => BotReply::text(NO_CHART_DATA_MESSAGE),
            Err(err) => {
                warn!(ticker, error = %err, "Chart failed");
                BotReply::text(format!("❌ Ошибка при построении графика: {err}"))
            }
        }
    }

    /// Formatted statistics, or the failure line as `Err`
    fn stats_reply(&self, ticker: &str, query: &ParsedQuery) -> std::result::Result<String, String> {
        let stats = self
            .store
            .fetch(ticker, query.start_date, query.end_date)
            .and_then(|series| compute(&series));

        match stats {
            Ok(stats) => Ok(format_stats_message(&stats, ticker)),
            Err(StockError::NoData) => Err(NO_DATA_MESSAGE.to_string()),
            Err(StockError::Computation(reason)) => Err(format!("❌ Ошибка расчета: {reason}")),
            Err(err) => {
                warn!(ticker, error = %err, "Statistics failed");
                Err(format!("❌ Ошибка расчета: {err}"))
            }
        }
    }
}

impl std::fmt::Debug for StockBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StockBot")
            .field("parser", &self.parser)
            .field("generator", &self.generator)
            .finish_non_exhaustive()
    }
}

/// Echo of the parsed query shown when no company was recognised
fn query_summary(query: &ParsedQuery) -> String {
    format!(
        "🤖 Анализирую через AI...\n\nТикер: {}\nПериод: {} - {}\nТип запроса: {}\n\n",
        query.ticker.as_deref().unwrap_or("не указан"),
        query.start_date,
        query.end_date,
        query.request_type
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryPriceStore, PriceRecord};
    use chrono::NaiveDate;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn bot() -> StockBot {
        let store = InMemoryPriceStore::new()
            .with_series(
                "AAPL",
                [
                    PriceRecord::flat(day(3, 1), 100.0, 1_000),
                    PriceRecord::flat(day(3, 28), 110.0, 3_000),
                ],
            )
            .with_series("ZM", [PriceRecord::flat(day(5, 2), 0.0, 10)]);
        StockBot::with_store(Arc::new(store), &ModelConfig::default()).unwrap()
    }

    fn texts(replies: &[BotReply]) -> Vec<&str> {
        replies.iter().map(BotReply::as_text).collect()
    }

    #[tokio::test]
    async fn test_start_and_help() {
        let bot = bot();
        assert_eq!(texts(&bot.handle("/start").await), vec![START_TEXT]);
        assert_eq!(texts(&bot.handle("/help").await), vec![HELP_TEXT]);
        assert!(bot.handle("/exit").await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let replies = bot().handle("/watch AAPL").await;
        assert_eq!(texts(&replies), vec!["❌ Unknown command: /watch"]);
    }

    #[tokio::test]
    async fn test_graph_request() {
        let replies = bot().handle("Покажи график Apple за март").await;

        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0], BotReply::Text(CHART_PROGRESS.to_string()));
        let BotReply::Chart { data, caption } = &replies[1] else {
            panic!("expected chart, got {:?}", replies[1]);
        };
        assert_eq!(data.points.len(), 2);
        assert_eq!(caption, "📈 График AAPL за период 2024-03-01 - 2024-03-31");
    }

    #[tokio::test]
    async fn test_graph_without_data() {
        let replies = bot().handle("Покажи график Apple за июль").await;
        assert_eq!(texts(&replies), vec![CHART_PROGRESS, NO_CHART_DATA_MESSAGE]);
    }

    #[tokio::test]
    async fn test_stats_request() {
        let replies = bot().handle("Статистика эпл за март").await;
        assert_eq!(replies.len(), 1);
        assert!(replies[0].as_text().starts_with("📊 Статистика AAPL"));
        assert!(replies[0].as_text().contains("(10.0%)"));
    }

    #[tokio::test]
    async fn test_unknown_type_gets_stats() {
        let replies = bot().handle("apple март").await;
        assert!(replies[0].as_text().starts_with("📊 Статистика AAPL"));
    }

    #[tokio::test]
    async fn test_analysis_request_without_credential() {
        let replies = bot().handle("Анализ Apple за март").await;

        assert_eq!(replies.len(), 3);
        assert!(replies[0].as_text().starts_with("📊 Статистика AAPL"));
        assert_eq!(replies[1].as_text(), ANALYSIS_PROGRESS);
        assert!(replies[2].as_text().starts_with("Аналитика (анализ на правилах):"));
    }

    #[tokio::test]
    async fn test_no_data() {
        let replies = bot().handle("Анализ Cisco").await;
        assert_eq!(texts(&replies), vec![NO_DATA_MESSAGE]);
    }

    #[tokio::test]
    async fn test_computation_error_is_reported() {
        let replies = bot().handle("статистика zoom").await;
        assert!(replies[0].as_text().starts_with("❌ Ошибка расчета:"));
    }

    #[tokio::test]
    async fn test_missing_company() {
        let replies = bot().handle("анализ Tesla").await;
        assert_eq!(
            texts(&replies),
            vec![
                "🤖 Анализирую через AI...\n\nТикер: не указан\nПериод: 2024-01-01 - 2024-12-31\n\
                 Тип запроса: analysis\n\n❌ Укажи компанию: Apple, Microsoft, Google, NVIDIA, \
                 AMD, Adobe, Cisco, Salesforce, Uber, Zoom, Logitech, Philips, ZI"
            ]
        );
    }
}
