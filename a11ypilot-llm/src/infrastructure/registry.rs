//! Provider construction from configuration

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use a11ypilot_core::config::LlmConfig;

use crate::domain::{LlmError, LlmProvider};
use crate::infrastructure::providers::{OpenAIProvider, ResilientProvider};

/// Provider type identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProviderType {
    OpenAI,
    Azure,
    Custom(String),
}

impl ProviderType {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "openai" | "gpt" => Self::OpenAI,
            "azure" | "azure_openai" => Self::Azure,
            other => Self::Custom(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::OpenAI => "openai",
            Self::Azure => "azure",
            Self::Custom(s) => s,
        }
    }
}

/// Builds the configured reasoning provider
pub struct ProviderRegistry;

impl ProviderRegistry {
    /// The active provider, wrapped for resilience when enabled.
    ///
    /// Returns `Ok(None)` when the active provider has no credential, so the
    /// engines can go straight to their deterministic paths without any
    /// network traffic.
    pub fn from_llm_config(config: &LlmConfig) -> Result<Option<Arc<dyn LlmProvider>>, LlmError> {
        if !config.has_credentials() {
            info!(provider = %config.provider, "No reasoning-service credential configured, using deterministic scoring");
            return Ok(None);
        }

        // Engines bound each call with `timeout_seconds`; the client gets headroom for retries.
        let client_timeout = Duration::from_secs(config.timeout_seconds.max(1) * 2);

        let base: Arc<dyn LlmProvider> = match ProviderType::parse(&config.provider) {
            ProviderType::OpenAI => {
                let api_key = config.openai.api_key.clone().unwrap_or_default();
                let mut provider = OpenAIProvider::new(api_key, &config.default_model)
                    .with_timeout(client_timeout);
                if !config.openai.base_url.is_empty() {
                    provider = provider.with_base_url(&config.openai.base_url);
                }
                if let Some(ref org) = config.openai.organization_id {
                    provider = provider.with_organization(org);
                }
                Arc::new(provider)
            }
            ProviderType::Azure => {
                if config.azure.endpoint.is_empty() {
                    return Err(LlmError::Configuration(
                        "Azure endpoint not configured".to_string(),
                    ));
                }
                if config.azure.deployment.is_empty() {
                    return Err(LlmError::Configuration(
                        "Azure deployment not configured".to_string(),
                    ));
                }
                let api_key = config.azure.api_key.clone().unwrap_or_default();
                Arc::new(
                    OpenAIProvider::azure(
                        &config.azure.endpoint,
                        api_key,
                        &config.azure.deployment,
                        &config.azure.api_version,
                    )
                    .with_timeout(client_timeout),
                )
            }
            ProviderType::Custom(name) => {
                return Err(LlmError::ProviderNotFound(format!(
                    "Unknown provider: {}. Valid options: openai, azure",
                    name
                )));
            }
        };

        let provider: Arc<dyn LlmProvider> = if config.resilience.enabled {
            Arc::new(ResilientProvider::new(base, config.resilience.clone()))
        } else {
            base
        };

        info!(provider = provider.info().id, model = provider.default_model(), "Reasoning provider configured");
        Ok(Some(provider))
    }
}
