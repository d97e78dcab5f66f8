//! Reasoning-service provider trait

use async_trait::async_trait;

use crate::domain::error::LlmError;
use crate::domain::messages::{CompletionRequest, CompletionResponse};

/// Metadata about a provider
#[derive(Debug, Clone)]
pub struct ProviderInfo {
    /// Provider identifier ("openai", "azure", ...)
    pub id: &'static str,
    /// Human-readable name
    pub name: &'static str,
}

/// Core trait for reasoning-service providers
///
/// Object-safe; the engines hold providers as `Arc<dyn LlmProvider>` so tests
/// can swap in doubles through the constructors.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn info(&self) -> ProviderInfo;

    /// Generate a completion
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    fn default_model(&self) -> &str;
}
