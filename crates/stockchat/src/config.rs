//! Configuration for the remote model and the chat bot
//!
//! Configuration is read once at process start, normalised, and passed
//! explicitly into [`QueryParser`](crate::query::QueryParser) and
//! [`AnalysisGenerator`](crate::analysis::AnalysisGenerator).

use crate::error::{Result, StockError};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use stockchat_llm::LLMProvider;
use stockchat_llm::providers::{GeminiConfig, GeminiProvider};
use stockchat_utils::{env_non_empty, non_empty};

/// Model used when none is configured
pub const DEFAULT_PRIMARY_MODEL: &str = "gemini-2.0-flash-latest";

/// Secondary model used by the analysis path when none is configured
pub const DEFAULT_FALLBACK_MODEL: &str = "gemini-1.5-flash";

/// Default generate-content endpoint
pub const DEFAULT_API_BASE: &str = stockchat_llm::providers::gemini::DEFAULT_GEMINI_API_BASE;

/// Default database file produced by the data loader
pub const DEFAULT_DATABASE_PATH: &str = "stocks.db";

/// Strip surrounding whitespace and a `models/` prefix from a model name
///
/// Names copied from the ListModels endpoint look like `models/gemini-1.5-flash`.
/// Blank names resolve to `default`.
pub fn normalize_model_name(raw: Option<&str>, default: &str) -> String {
    let cleaned = raw.map(str::trim).unwrap_or_default();
    let cleaned = cleaned
        .strip_prefix("models/")
        .map_or(cleaned, str::trim);
    if cleaned.is_empty() {
        default.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Remote model configuration
#[derive(Clone)]
pub struct ModelConfig {
    /// API key; `None` switches every component to its rule-based path
    pub api_key: Option<String>,

    /// Model used for query classification and the first analysis attempt
    pub primary_model: String,

    /// Model used for the single analysis retry
    pub fallback_model: Option<String>,

    /// Base URL of the generate-content API
    pub api_base: String,

    /// Timeout applied to every remote call
    pub request_timeout: Duration,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            primary_model: DEFAULT_PRIMARY_MODEL.to_string(),
            fallback_model: Some(DEFAULT_FALLBACK_MODEL.to_string()),
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("primary_model", &self.primary_model)
            .field("fallback_model", &self.fallback_model)
            .field("api_base", &self.api_base)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ModelConfig {
    /// Create a new configuration builder
    pub fn builder() -> ModelConfigBuilder {
        ModelConfigBuilder::default()
    }

    /// Whether a credential for the remote model is configured
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Secondary model, only when it differs from the primary one
    pub fn distinct_fallback(&self) -> Option<&str> {
        self.fallback_model
            .as_deref()
            .filter(|model| *model != self.primary_model)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout.is_zero() {
            return Err(StockError::ConfigError(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        if self.api_base.trim().is_empty() {
            return Err(StockError::ConfigError("api_base must not be empty".to_string()));
        }

        if self.primary_model.is_empty() {
            return Err(StockError::ConfigError("primary model must not be empty".to_string()));
        }

        Ok(())
    }

    /// Provider settings, or `None` when no credential is configured
    pub fn gemini_config(&self) -> Option<GeminiConfig> {
        let api_key = self.api_key.as_ref()?;
        Some(
            GeminiConfig::new(api_key.clone())
                .with_api_base(self.api_base.clone())
                .with_timeout(self.request_timeout),
        )
    }

    /// Build the remote provider, or `None` when no credential is configured
    pub fn provider(&self) -> Result<Option<Arc<dyn LLMProvider>>> {
        let Some(config) = self.gemini_config() else {
            return Ok(None);
        };

        let provider = GeminiProvider::with_config(config)?;
        Ok(Some(Arc::new(provider)))
    }
}

/// Builder for ModelConfig
#[derive(Default)]
pub struct ModelConfigBuilder {
    api_key: Option<String>,
    primary_model: Option<String>,
    fallback_model: Option<String>,
    disable_fallback: bool,
    api_base: Option<String>,
    request_timeout: Option<Duration>,
}

impl ModelConfigBuilder {
    /// Set the API key; blank keys count as absent
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = non_empty(Some(key.into()));
        self
    }

    /// Set the primary model
    pub fn primary_model(mut self, model: impl Into<String>) -> Self {
        self.primary_model = Some(model.into());
        self
    }

    /// Set the fallback model
    pub fn fallback_model(mut self, model: impl Into<String>) -> Self {
        self.fallback_model = Some(model.into());
        self
    }

    /// Never retry analysis against a second model
    pub fn no_fallback(mut self) -> Self {
        self.disable_fallback = true;
        self
    }

    /// Set the API base URL
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// Set the per-call timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Fill unset values from `GOOGLE_API_KEY`, `GOOGLE_MODEL`,
    /// `GOOGLE_FALLBACK_MODEL` and `GOOGLE_API_BASE`
    pub fn with_env(mut self) -> Self {
        if self.api_key.is_none() {
            self.api_key = env_non_empty("GOOGLE_API_KEY");
        }
        if self.primary_model.is_none() {
            self.primary_model = env_non_empty("GOOGLE_MODEL");
        }
        if self.fallback_model.is_none() {
            self.fallback_model = env_non_empty("GOOGLE_FALLBACK_MODEL");
        }
        if self.api_base.is_none() {
            self.api_base = env_non_empty("GOOGLE_API_BASE");
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ModelConfig> {
        let defaults = ModelConfig::default();

        let fallback_model = if self.disable_fallback {
            None
        } else {
            Some(normalize_model_name(
                self.fallback_model.as_deref(),
                DEFAULT_FALLBACK_MODEL,
            ))
        };

        let config = ModelConfig {
            api_key: self.api_key,
            primary_model: normalize_model_name(
                self.primary_model.as_deref(),
                DEFAULT_PRIMARY_MODEL,
            ),
            fallback_model,
            api_base: self
                .api_base
                .map_or(defaults.api_base, |base| base.trim().trim_end_matches('/').to_string()),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
        };

        config.validate()?;
        Ok(config)
    }
}

/// Configuration for the chat bot
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// SQLite database with the `stock_prices` table
    pub database_path: PathBuf,

    /// Remote model configuration
    pub models: ModelConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            models: ModelConfig::default(),
        }
    }
}

impl BotConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self> {
        let models = ModelConfig::builder().with_env().build()?;
        let database_path = env_non_empty("STOCKCHAT_DB")
            .map_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH), PathBuf::from);

        Ok(Self {
            database_path,
            models,
        })
    }

    /// Create a builder
    pub fn builder() -> BotConfigBuilder {
        BotConfigBuilder::default()
    }
}

/// Builder for BotConfig
#[derive(Debug, Default)]
pub struct BotConfigBuilder {
    database_path: Option<PathBuf>,
    models: Option<ModelConfig>,
}

impl BotConfigBuilder {
    /// Set the database path
    pub fn database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = Some(path.into());
        self
    }

    /// Set the model configuration
    pub fn models(mut self, models: ModelConfig) -> Self {
        self.models = Some(models);
        self
    }

    /// Build the config
    pub fn build(self) -> BotConfig {
        let defaults = BotConfig::default();
        BotConfig {
            database_path: self.database_path.unwrap_or(defaults.database_path),
            models: self.models.unwrap_or(defaults.models),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_model_name() {
        assert_eq!(
            normalize_model_name(Some("  models/gemini-1.5-pro \n"), DEFAULT_PRIMARY_MODEL),
            "gemini-1.5-pro"
        );
        assert_eq!(
            normalize_model_name(Some("gemini-1.5-flash"), DEFAULT_PRIMARY_MODEL),
            "gemini-1.5-flash"
        );
        assert_eq!(normalize_model_name(Some("   "), "fallback"), "fallback");
        assert_eq!(normalize_model_name(Some("models/"), "fallback"), "fallback");
        assert_eq!(normalize_model_name(None, "fallback"), "fallback");
    }

    #[test]
    fn test_default_config() {
        let config = ModelConfig::default();
        assert!(!config.has_credential());
        assert_eq!(config.primary_model, DEFAULT_PRIMARY_MODEL);
        assert_eq!(config.distinct_fallback(), Some(DEFAULT_FALLBACK_MODEL));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_normalizes_models() {
        let config = ModelConfig::builder()
            .api_key("  key  ")
            .primary_model("models/gemini-1.5-pro")
            .fallback_model(" models/gemini-1.5-flash ")
            .api_base("http://localhost:9000/v1beta/")
            .build()
            .unwrap();

        assert_eq!(config.api_key.as_deref(), Some("key"));
        assert_eq!(config.primary_model, "gemini-1.5-pro");
        assert_eq!(config.fallback_model.as_deref(), Some("gemini-1.5-flash"));
        assert_eq!(config.api_base, "http://localhost:9000/v1beta");
    }

    #[test]
    fn test_blank_key_is_absent() {
        let config = ModelConfig::builder().api_key("   ").build().unwrap();
        assert!(!config.has_credential());
        assert!(config.provider().unwrap().is_none());
    }

    #[test]
    fn test_same_fallback_is_not_distinct() {
        let config = ModelConfig::builder()
            .primary_model("gemini-1.5-flash")
            .fallback_model("models/gemini-1.5-flash")
            .build()
            .unwrap();
        assert_eq!(config.distinct_fallback(), None);

        let config = ModelConfig::builder().no_fallback().build().unwrap();
        assert_eq!(config.distinct_fallback(), None);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = ModelConfig::builder()
            .request_timeout(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(StockError::ConfigError(_))));
    }

    #[test]
    fn test_provider_built_with_key() {
        let config = ModelConfig::builder().api_key("key").build().unwrap();
        let provider = config.provider().unwrap().unwrap();
        assert_eq!(provider.name(), "gemini");
    }

    #[test]
    fn test_fractional_timeout_reaches_provider() {
        let config = ModelConfig::builder()
            .api_key("key")
            .request_timeout(Duration::from_millis(1500))
            .build()
            .unwrap();

        let gemini = config.gemini_config().unwrap();
        assert_eq!(gemini.timeout, Duration::from_millis(1500));
        assert_eq!(gemini.api_base, DEFAULT_API_BASE);

        let config = ModelConfig::builder()
            .request_timeout(Duration::from_millis(250))
            .build()
            .unwrap();
        assert!(config.gemini_config().is_none());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ModelConfig::builder().api_key("secret").build().unwrap();
        assert!(!format!("{config:?}").contains("secret"));
    }

    #[test]
    fn test_bot_config_builder() {
        let config = BotConfig::builder().database_path("/tmp/prices.db").build();
        assert_eq!(config.database_path, PathBuf::from("/tmp/prices.db"));
        assert!(!config.models.has_credential());
    }
}
