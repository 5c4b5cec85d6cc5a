//! Model-assisted query parser with rule-based fallback

use super::{ParsedQuery, RequestType, parse_rules};
use crate::error::{Result, StockError};
use crate::prompts::classifier_prompt;
use chrono::NaiveDate;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::Arc;
use stockchat_llm::{CompletionRequest, LLMProvider, Message};
use tracing::{debug, info, instrument, warn};

const CLASSIFIER_TEMPERATURE: f32 = 0.1;
const CLASSIFIER_MAX_TOKENS: usize = 200;

/// Query parser that asks the remote model first
///
/// Without a provider every call goes straight to [`parse_rules`]. With one,
/// the model is called exactly once per message; any failure falls back to
/// the rule-based result for the same text.
#[derive(Clone)]
pub struct QueryParser {
    provider: Option<Arc<dyn LLMProvider>>,
    model: String,
}

impl QueryParser {
    /// Create a parser; `None` disables the remote call
    pub fn new(provider: Option<Arc<dyn LLMProvider>>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Parser that never calls a remote model
    pub fn rule_based() -> Self {
        Self::new(None, String::new())
    }

    /// Whether a remote model is configured
    pub fn is_remote(&self) -> bool {
        self.provider.is_some()
    }

    /// Parse a chat message; never fails
    pub async fn parse(&self, text: &str) -> ParsedQuery {
        let base = parse_rules(text);

        let Some(provider) = &self.provider else {
            debug!("No model credential, using rule-based parser");
            return base;
        };

        match self.classify(provider.as_ref(), text).await {
            Ok(fields) => merge(&fields, base),
            Err(err) => {
                warn!(model = %self.model, error = %err, "Query classification failed");
                info!("Falling back to rule-based parser");
                base
            }
        }
    }

    #[instrument(skip(self, provider, text), fields(model = %self.model))]
    async fn classify(&self, provider: &dyn LLMProvider, text: &str) -> Result<Map<String, Value>> {
        let request = CompletionRequest::builder(&self.model)
            .add_message(Message::user(classifier_prompt(text)?))
            .temperature(CLASSIFIER_TEMPERATURE)
            .max_tokens(CLASSIFIER_MAX_TOKENS)
            .build();

        let response = provider.complete(request).await?;
        let text = response.text();
        debug!(response = %text, "Classifier answered");

        extract_json_object(&text)
    }
}

impl std::fmt::Debug for QueryParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryParser")
            .field("remote", &self.is_remote())
            .field("model", &self.model)
            .finish()
    }
}

/// Extract the first flat `{...}` block from model output
///
/// Nested objects are not supported; the classifier is asked for a flat
/// object with four keys.
pub fn extract_json_object(text: &str) -> Result<Map<String, Value>> {
    let re = Regex::new(r"\{[^}]*\}").map_err(|e| StockError::Other(e.to_string()))?;

    let block = re
        .find(text)
        .ok_or_else(|| StockError::MalformedOutput("no JSON object in response".to_string()))?;

    match serde_json::from_str::<Value>(block.as_str()) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(StockError::MalformedOutput("JSON block is not an object".to_string())),
        Err(e) => Err(StockError::MalformedOutput(format!("invalid JSON: {e}"))),
    }
}

/// First non-blank string among `keys`
fn field<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| fields.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|value| !value.is_empty())
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Merge remote fields over the rule-based result, one field at a time
///
/// Missing, blank or unparseable remote values keep the rule-based value.
/// An inverted remote range keeps the rule-based range.
fn merge(fields: &Map<String, Value>, base: ParsedQuery) -> ParsedQuery {
    let ticker = field(fields, &["ticker", "symbol"])
        .map(str::to_uppercase)
        .or(base.ticker);

    let start_date = field(fields, &["start_date", "from"])
        .and_then(parse_date)
        .unwrap_or(base.start_date);
    let end_date = field(fields, &["end_date", "to"])
        .and_then(parse_date)
        .unwrap_or(base.end_date);

    let (start_date, end_date) = if start_date <= end_date {
        (start_date, end_date)
    } else {
        debug!(%start_date, %end_date, "Model returned an inverted range");
        (base.start_date, base.end_date)
    };

    let request_type = field(fields, &["request_type", "type"])
        .and_then(RequestType::parse)
        .unwrap_or(base.request_type);

    ParsedQuery {
        ticker,
        start_date,
        end_date,
        request_type,
    }
}
