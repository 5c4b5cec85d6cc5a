//! Model-written analysis with a two-model chain and rule-based fallback

use super::narrator::narrate;
use super::{ANALYSIS_FAILED_MESSAGE, NO_ANALYSIS_DATA_MESSAGE};
use crate::config::ModelConfig;
use crate::error::{Result, StockError};
use crate::prompts::analysis_prompt;
use crate::stats::{StockStatistics, compute};
use crate::store::PriceSeriesStore;
use chrono::NaiveDate;
use std::sync::Arc;
use stockchat_llm::{CompletionRequest, LLMProvider, Message};
use tracing::{debug, info, instrument, warn};

/// Heading of every model-written analysis
pub const AI_HEADING: &str = "AI-Аналитика:\n\n";

const ANALYSIS_TEMPERATURE: f32 = 0.6;
const PRIMARY_MAX_TOKENS: usize = 512;
const FALLBACK_MAX_TOKENS: usize = 384;

/// Strip whitespace and code fences, then add the heading
pub fn format_ai_response(text: &str) -> String {
    let cleaned = text.trim();
    let cleaned = if cleaned.contains("```") {
        cleaned.replace("```", "").trim().to_string()
    } else {
        cleaned.to_string()
    };
    format!("{AI_HEADING}{cleaned}")
}

/// Produces the analysis reply for a ticker and period
///
/// Resolution order: primary model, then the fallback model when it differs
/// from the primary, then [`narrate`]. At most two remote calls per request.
#[derive(Clone)]
pub struct AnalysisGenerator {
    store: Arc<dyn PriceSeriesStore>,
    provider: Option<Arc<dyn LLMProvider>>,
    primary_model: String,
    fallback_model: Option<String>,
}

impl AnalysisGenerator {
    /// Create a generator; `provider = None` always uses the narrator
    pub fn new(
        store: Arc<dyn PriceSeriesStore>,
        provider: Option<Arc<dyn LLMProvider>>,
        models: &ModelConfig,
    ) -> Self {
        Self {
            store,
            provider,
            primary_model: models.primary_model.clone(),
            fallback_model: models.distinct_fallback().map(str::to_string),
        }
    }

    /// Analysis text for `ticker` over `[start, end]`; never fails
    pub async fn generate(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> String {
        let stats = match self.statistics(ticker, start, end) {
            Ok(stats) => stats,
            Err(StockError::NoData) => return NO_ANALYSIS_DATA_MESSAGE.to_string(),
            Err(err) => {
                warn!(ticker, error = %err, "Statistics unavailable for analysis");
                return ANALYSIS_FAILED_MESSAGE.to_string();
            }
        };

        let Some(provider) = &self.provider else {
            debug!("No model credential, using rule-based narrator");
            return narrate(&stats, ticker);
        };

        match self
            .remote_analysis(provider.as_ref(), ticker, start, end, &stats)
            .await
        {
            Ok(text) => text,
            Err(err) if err.is_recoverable() => {
                info!(ticker, error = %err, "Falling back to rule-based narrator");
                narrate(&stats, ticker)
            }
            Err(err) => {
                warn!(ticker, error = %err, "Analysis prompt failed, using rule-based narrator");
                narrate(&stats, ticker)
            }
        }
    }

    fn statistics(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<StockStatistics> {
        let series = self.store.fetch(ticker, start, end)?;
        compute(&series)
    }

    async fn remote_analysis(
        &self,
        provider: &dyn LLMProvider,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
        stats: &StockStatistics,
    ) -> Result<String> {
        let prompt = analysis_prompt(ticker, start, end, stats)?;

        let err = match self
            .attempt(provider, &self.primary_model, &prompt, PRIMARY_MAX_TOKENS)
            .await
        {
            Ok(text) => return Ok(text),
            Err(err) => err,
        };
        warn!(model = %self.primary_model, error = %err, "Primary model failed");

        let Some(fallback) = &self.fallback_model else {
            return Err(err);
        };
        info!(model = %fallback, "Retrying analysis with fallback model");

        self.attempt(provider, fallback, &prompt, FALLBACK_MAX_TOKENS)
            .await
            .inspect_err(|err| warn!(model = %fallback, error = %err, "Fallback model failed"))
    }

    #[instrument(skip(self, provider, model, prompt), fields(model = %model))]
    async fn attempt(
        &self,
        provider: &dyn LLMProvider,
        model: &str,
        prompt: &str,
        max_tokens: usize,
    ) -> Result<String> {
        let request = CompletionRequest::builder(model)
            .add_message(Message::user(prompt))
            .temperature(ANALYSIS_TEMPERATURE)
            .max_tokens(max_tokens)
            .text_only()
            .build();

        let response = provider.complete(request).await?;
        let text = response.text();
        if text.replace("```", "").trim().is_empty() {
            return Err(StockError::MalformedOutput(format!(
                "empty response (stop reason {:?})",
                response.stop_reason
            )));
        }

        Ok(format_ai_response(&text))
    }
}

impl std::fmt::Debug for AnalysisGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisGenerator")
            .field("remote", &self.provider.is_some())
            .field("primary_model", &self.primary_model)
            .field("fallback_model", &self.fallback_model)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryPriceStore, PriceRecord};
    use crate::test_support::{MockProvider, text_response};
    use mockall::Sequence;
    use stockchat_llm::LLMError;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn store() -> Arc<dyn PriceSeriesStore> {
        Arc::new(InMemoryPriceStore::new().with_series(
            "AAPL",
            [
                PriceRecord::flat(day(3, 1), 100.0, 60_000_000),
                PriceRecord::flat(day(3, 15), 104.0, 70_000_000),
                PriceRecord::flat(day(3, 29), 110.0, 80_000_000),
            ],
        ))
    }

    fn models() -> ModelConfig {
        ModelConfig::builder()
            .api_key("key")
            .primary_model("gemini-pro-test")
            .fallback_model("gemini-flash-test")
            .build()
            .unwrap()
    }

    fn expected_narration() -> String {
        let series = store().fetch("AAPL", day(3, 1), day(3, 31)).unwrap();
        narrate(&compute(&series).unwrap(), "AAPL")
    }

    #[test]
    fn test_format_ai_response() {
        assert_eq!(format_ai_response("  Рост.  "), "AI-Аналитика:\n\nРост.");
        assert_eq!(
            format_ai_response("```\nТренд вверх.\n```\n"),
            "AI-Аналитика:\n\nТренд вверх."
        );
    }

    #[tokio::test]
    async fn test_without_provider_uses_narrator() {
        let generator = AnalysisGenerator::new(store(), None, &ModelConfig::default());
        let text = generator.generate("AAPL", day(3, 1), day(3, 31)).await;
        assert_eq!(text, expected_narration());
    }

    #[tokio::test]
    async fn test_no_data_message() {
        let generator = AnalysisGenerator::new(store(), None, &ModelConfig::default());
        let text = generator.generate("MSFT", day(3, 1), day(3, 31)).await;
        assert_eq!(text, NO_ANALYSIS_DATA_MESSAGE);
    }

    #[tokio::test]
    async fn test_computation_error_is_generic_failure() {
        let store: Arc<dyn PriceSeriesStore> = Arc::new(
            InMemoryPriceStore::new().with_series("ZI", [PriceRecord::flat(day(1, 2), 0.0, 1)]),
        );
        let generator = AnalysisGenerator::new(store, None, &ModelConfig::default());
        let text = generator.generate("ZI", day(1, 1), day(12, 31)).await;
        assert_eq!(text, ANALYSIS_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn test_primary_success() {
        let mut provider = MockProvider::new();
        provider
            .expect_complete()
            .withf(|r| {
                r.model == "gemini-pro-test"
                    && r.max_tokens == 512
                    && r.temperature == Some(0.6)
                    && r.text_only
                    && r.messages[0].text().contains("Тикер: AAPL")
            })
            .times(1)
            .returning(|_| Ok(text_response("Тренд восходящий.")));

        let generator = AnalysisGenerator::new(store(), Some(Arc::new(provider)), &models());
        let text = generator.generate("AAPL", day(3, 1), day(3, 31)).await;
        assert_eq!(text, "AI-Аналитика:\n\nТренд восходящий.");
    }

    #[tokio::test]
    async fn test_primary_timeout_then_fallback_succeeds() {
        let mut seq = Sequence::new();
        let mut provider = MockProvider::new();
        provider
            .expect_complete()
            .withf(|r| r.model == "gemini-pro-test")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Err(LLMError::Status {
                    status: 504,
                    body: "deadline exceeded".to_string(),
                })
            });
        provider
            .expect_complete()
            .withf(|r| r.model == "gemini-flash-test" && r.max_tokens == 384)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(text_response("```Коррекция завершена.```")));

        let generator = AnalysisGenerator::new(store(), Some(Arc::new(provider)), &models());
        let text = generator.generate("AAPL", day(3, 1), day(3, 31)).await;
        assert_eq!(text, "AI-Аналитика:\n\nКоррекция завершена.");
    }

    #[tokio::test]
    async fn test_empty_primary_then_failing_fallback_uses_narrator() {
        let mut seq = Sequence::new();
        let mut provider = MockProvider::new();
        provider
            .expect_complete()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(text_response("  ")));
        provider
            .expect_complete()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(LLMError::RateLimited("quota".to_string())));

        let generator = AnalysisGenerator::new(store(), Some(Arc::new(provider)), &models());
        let text = generator.generate("AAPL", day(3, 1), day(3, 31)).await;
        assert_eq!(text, expected_narration());
    }

    #[tokio::test]
    async fn test_same_fallback_model_is_not_retried() {
        let mut provider = MockProvider::new();
        provider
            .expect_complete()
            .times(1)
            .returning(|_| Err(LLMError::Unauthorized));

        let models = ModelConfig::builder()
            .api_key("key")
            .primary_model("gemini-1.5-flash")
            .fallback_model("models/gemini-1.5-flash")
            .build()
            .unwrap();
        let generator = AnalysisGenerator::new(store(), Some(Arc::new(provider)), &models);
        let text = generator.generate("AAPL", day(3, 1), day(3, 31)).await;
        assert_eq!(text, expected_narration());
    }
}
