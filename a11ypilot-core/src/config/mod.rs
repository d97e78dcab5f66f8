//! Configuration management

pub mod validation;

pub use validation::{Validate, ValidationError};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub renderer: RendererConfig,
    pub evaluator: EvaluatorConfig,
    pub crawl: CrawlConfig,
    pub llm: LlmConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "info" or "a11ypilot_scan=debug,info"
    pub level: String,
    /// Output format: "json", "pretty" or "compact"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

/// Page renderer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Hard bound on a single page navigation (in seconds)
    pub navigation_timeout_seconds: u64,
    /// Fixed delay applied after the page settles, before inspection (in milliseconds)
    pub settle_delay_ms: u64,
    /// User agent reported to the target site
    pub user_agent: String,
    /// Viewport width recorded in scan metadata
    pub viewport_width: u32,
    /// Viewport height recorded in scan metadata
    pub viewport_height: u32,
    /// Maximum number of same-origin stylesheets collected per page
    pub max_stylesheets: usize,
    /// Accept invalid TLS certificates (development only)
    pub accept_invalid_certs: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_seconds: 30,
            settle_delay_ms: 2000,
            user_agent: format!(
                "Mozilla/5.0 (compatible; a11ypilot/{}; +accessibility-audit)",
                env!("CARGO_PKG_VERSION")
            ),
            viewport_width: 1920,
            viewport_height: 1080,
            max_stylesheets: 10,
            accept_invalid_certs: false,
        }
    }
}

impl RendererConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_seconds)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// External rule evaluator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Endpoint of the axe-compatible evaluation service
    pub endpoint: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Rule tags passed to the evaluator as a filter
    pub tags: Vec<String>,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:4000/evaluate".to_string(),
            timeout_seconds: 60,
            tags: vec![
                "wcag2a".to_string(),
                "wcag2aa".to_string(),
                "wcag21a".to_string(),
                "wcag21aa".to_string(),
            ],
        }
    }
}

/// Crawl coordination configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Number of pages scanned concurrently (each in its own browsing context)
    pub max_concurrent_pages: usize,
    /// Page budget used when the caller does not provide one
    pub default_max_pages: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_concurrent_pages: 4,
            default_max_pages: 10,
        }
    }
}

/// Reasoning service (LLM) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Active provider: "openai" or "azure"
    pub provider: String,

    /// OpenAI-compatible provider configuration
    #[serde(default)]
    pub openai: OpenAIConfig,

    /// Azure OpenAI provider configuration
    #[serde(default)]
    pub azure: AzureOpenAIConfig,

    /// Default model to use (provider-specific)
    pub default_model: String,
    /// Model to use for priority scoring (overrides default)
    pub scoring_model: Option<String>,
    /// Model to use for code fixes (overrides default)
    pub code_fix_model: Option<String>,
    /// Temperature for generation (0.0 to 1.0)
    pub temperature: f64,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Upper bound on a single reasoning call in seconds
    pub timeout_seconds: u64,

    /// Resilience configuration
    #[serde(default)]
    pub resilience: LlmResilienceConfig,

    /// Fix-suggestion batching configuration
    #[serde(default)]
    pub fixes: LlmFixesConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            openai: OpenAIConfig::default(),
            azure: AzureOpenAIConfig::default(),
            default_model: "gpt-4o-mini".to_string(),
            scoring_model: None,
            code_fix_model: None,
            temperature: 0.2,
            max_tokens: 4096,
            timeout_seconds: 45,
            resilience: LlmResilienceConfig::default(),
            fixes: LlmFixesConfig::default(),
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Whether the active provider carries a credential.
    ///
    /// A missing key means the reasoning service is absent and callers go
    /// straight to their deterministic paths without touching the network.
    pub fn has_credentials(&self) -> bool {
        let key = match self.provider.to_lowercase().as_str() {
            "azure" | "azure_openai" => self.azure.api_key.as_deref(),
            _ => self.openai.api_key.as_deref(),
        };
        key.is_some_and(|k| !k.trim().is_empty())
    }
}

/// OpenAI provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAIConfig {
    /// API Key (can also use A11YPILOT__LLM__OPENAI__API_KEY)
    pub api_key: Option<String>,
    /// Base URL for the API
    pub base_url: String,
    /// Organization ID (optional)
    pub organization_id: Option<String>,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            organization_id: None,
        }
    }
}

/// Azure OpenAI provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureOpenAIConfig {
    /// Azure resource endpoint
    pub endpoint: String,
    /// API Key
    pub api_key: Option<String>,
    /// Deployment name
    pub deployment: String,
    /// API version
    pub api_version: String,
}

impl Default for AzureOpenAIConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: None,
            deployment: String::new(),
            api_version: "2024-02-15-preview".to_string(),
        }
    }
}

/// Resilience settings applied to the reasoning provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmResilienceConfig {
    /// Enable the retry / circuit breaker wrapper
    pub enabled: bool,
    /// Maximum number of retries for transient errors
    pub max_retries: u32,
    /// Initial backoff delay in milliseconds
    pub initial_backoff_ms: u64,
    /// Maximum backoff delay in milliseconds
    pub max_backoff_ms: u64,
    /// Number of failures before the circuit opens
    pub circuit_breaker_threshold: u32,
    /// Time in seconds before the circuit attempts to close
    pub circuit_breaker_timeout_secs: u64,
    /// Maximum requests allowed in half-open state
    pub half_open_max_requests: u32,
}

impl Default for LlmResilienceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 2,
            initial_backoff_ms: 500,
            max_backoff_ms: 10_000,
            circuit_breaker_threshold: 5,
            circuit_breaker_timeout_secs: 60,
            half_open_max_requests: 2,
        }
    }
}

/// Fix-suggestion batching
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmFixesConfig {
    /// Violations per reasoning request
    pub batch_size: usize,
    /// Batches in flight at once
    pub max_concurrent_batches: usize,
}

impl Default for LlmFixesConfig {
    fn default() -> Self {
        Self {
            batch_size: 3,
            max_concurrent_batches: 2,
        }
    }
}

impl Validate for Config {
    fn validate(&self) -> Result<(), ValidationError> {
        self.renderer.validate()?;
        self.evaluator.validate()?;
        self.crawl.validate()?;
        self.llm.validate()?;
        Ok(())
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigLoadError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false));

        // Add environment-specific config if ENV is set
        if let Ok(env) = std::env::var("ENV") {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{}", env)).required(false));
        }

        // Local config and environment variables last (highest priority)
        builder = builder
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("A11YPILOT").separator("__"));

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from an explicit file, still honouring environment overrides
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigLoadError> {
        let config: Config = config::Config::builder()
            .add_source(config::File::from(path).required(true))
            .add_source(config::Environment::with_prefix("A11YPILOT").separator("__"))
            .build()?
            .try_deserialize()?;
        config.validate()?;

        Ok(config)
    }
}

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Configuration file error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    Validation(#[from] ValidationError),
}
