//! Configuration validation module

use crate::config::{CrawlConfig, EvaluatorConfig, LlmConfig, RendererConfig};

/// Trait for validating configuration sections
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Renderer configuration error: {message}")]
    Renderer { message: String },

    #[error("Evaluator configuration error: {message}")]
    Evaluator { message: String },

    #[error("Crawl configuration error: {message}")]
    Crawl { message: String },

    #[error("LLM configuration error: {message}")]
    Llm { message: String },
}

impl ValidationError {
    pub fn renderer(message: impl Into<String>) -> Self {
        Self::Renderer {
            message: message.into(),
        }
    }

    pub fn evaluator(message: impl Into<String>) -> Self {
        Self::Evaluator {
            message: message.into(),
        }
    }

    pub fn crawl(message: impl Into<String>) -> Self {
        Self::Crawl {
            message: message.into(),
        }
    }

    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm {
            message: message.into(),
        }
    }
}

impl Validate for RendererConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.navigation_timeout_seconds == 0 {
            return Err(ValidationError::renderer(
                "navigation_timeout_seconds must be > 0",
            ));
        }
        if self.navigation_timeout_seconds > 300 {
            return Err(ValidationError::renderer(
                "navigation_timeout_seconds must be <= 300",
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ValidationError::renderer("user_agent cannot be empty"));
        }
        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err(ValidationError::renderer(
                "viewport dimensions must be > 0",
            ));
        }
        Ok(())
    }
}

impl Validate for EvaluatorConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        let endpoint = url::Url::parse(&self.endpoint).map_err(|e| {
            ValidationError::evaluator(format!("invalid endpoint '{}': {}", self.endpoint, e))
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ValidationError::evaluator(
                "endpoint must use http or https",
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(ValidationError::evaluator("timeout_seconds must be > 0"));
        }
        Ok(())
    }
}

impl Validate for CrawlConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.max_concurrent_pages == 0 {
            return Err(ValidationError::crawl("max_concurrent_pages must be > 0"));
        }
        if self.max_concurrent_pages > 16 {
            return Err(ValidationError::crawl("max_concurrent_pages must be <= 16"));
        }
        if self.default_max_pages == 0 {
            return Err(ValidationError::crawl("default_max_pages must be >= 1"));
        }
        Ok(())
    }
}

impl Validate for LlmConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_seconds == 0 {
            return Err(ValidationError::llm("LLM timeout must be > 0"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::llm("temperature must be within 0.0..=2.0"));
        }
        if self.fixes.batch_size == 0 {
            return Err(ValidationError::llm("fixes.batch_size must be > 0"));
        }
        if self.fixes.max_concurrent_batches == 0 {
            return Err(ValidationError::llm(
                "fixes.max_concurrent_batches must be > 0",
            ));
        }
        match self.provider.to_lowercase().as_str() {
            "openai" | "azure" | "azure_openai" => Ok(()),
            other => Err(ValidationError::llm(format!(
                "unsupported provider '{}'",
                other
            ))),
        }
    }
}
