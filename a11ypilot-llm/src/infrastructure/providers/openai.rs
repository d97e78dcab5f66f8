//! OpenAI-compatible provider implementation
//!
//! Works with OpenAI, Azure OpenAI, and any OpenAI-compatible API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::RETRY_AFTER;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::domain::{
    CompletionRequest, CompletionResponse, LlmError, LlmProvider, ProviderInfo, StopReason, Usage,
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_AZURE_API_VERSION: &str = "2024-02-15-preview";

/// OpenAI-compatible provider
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    organization_id: Option<String>,
    /// For Azure: deployment name (overrides model in URL)
    azure_deployment: Option<String>,
    azure_api_version: Option<String>,
}

impl OpenAIProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: build_client(Duration::from_secs(120)),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            organization_id: None,
            azure_deployment: None,
            azure_api_version: None,
        }
    }

    /// Create for Azure OpenAI
    pub fn azure(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        deployment: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        let deployment = deployment.into();
        Self {
            client: build_client(Duration::from_secs(120)),
            api_key: api_key.into(),
            base_url: endpoint.into().trim_end_matches('/').to_string(),
            model: deployment.clone(),
            organization_id: None,
            azure_deployment: Some(deployment),
            azure_api_version: Some(api_version.into()),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_organization(mut self, org_id: impl Into<String>) -> Self {
        self.organization_id = Some(org_id.into());
        self
    }

    /// Replace the HTTP client timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }

    fn chat_url(&self) -> String {
        if let Some(ref deployment) = self.azure_deployment {
            let api_version = self
                .azure_api_version
                .as_deref()
                .unwrap_or(DEFAULT_AZURE_API_VERSION);
            format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                self.base_url, deployment, api_version
            )
        } else {
            format!("{}/chat/completions", self.base_url)
        }
    }

    fn to_openai_request(&self, request: &CompletionRequest) -> OpenAIRequest {
        OpenAIRequest {
            model: request.model.clone().unwrap_or_else(|| self.model.clone()),
            messages: request
                .messages
                .iter()
                .map(|msg| OpenAIMessage {
                    role: msg.role.as_str().to_string(),
                    content: Some(msg.content.clone()),
                })
                .collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

fn build_client(timeout: Duration) -> Client {
    Client::builder().timeout(timeout).build().unwrap_or_else(|e| {
        error!(error = %e, "Failed to build HTTP client with custom timeout, using default client");
        Client::new()
    })
}

fn parse_openai_response(response: OpenAIResponse) -> CompletionResponse {
    let choice = response.choices.into_iter().next();

    let stop_reason = choice
        .as_ref()
        .and_then(|c| c.finish_reason.as_deref())
        .map(|r| match r {
            "stop" => StopReason::EndTurn,
            "length" => StopReason::MaxTokens,
            "content_filter" => StopReason::ContentFilter,
            _ => StopReason::Other,
        })
        .unwrap_or(StopReason::Other);

    let content = choice
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .unwrap_or_default();

    let usage = response
        .usage
        .map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        })
        .unwrap_or_default();

    CompletionResponse {
        id: response.id,
        model: response.model,
        content,
        stop_reason,
        usage,
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    fn info(&self) -> ProviderInfo {
        if self.azure_deployment.is_some() {
            ProviderInfo {
                id: "azure",
                name: "Azure OpenAI",
            }
        } else {
            ProviderInfo {
                id: "openai",
                name: "OpenAI",
            }
        }
    }

    fn default_model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let url = self.chat_url();
        let openai_request = self.to_openai_request(&request);

        debug!(model = %openai_request.model, "Sending request to OpenAI-compatible API");

        let mut req = self.client.post(&url);
        if self.azure_deployment.is_some() {
            req = req.header("api-key", &self.api_key);
        } else {
            req = req.bearer_auth(&self.api_key);
            if let Some(ref org) = self.organization_id {
                req = req.header("OpenAI-Organization", org);
            }
        }

        let response = req.json(&openai_request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let text = response.text().await.unwrap_or_default();

            return Err(match status.as_u16() {
                429 => LlmError::rate_limited(text, retry_after),
                401 | 403 => LlmError::auth(text),
                400 => LlmError::InvalidRequest(text),
                code if code >= 500 => LlmError::ServiceUnavailable(text),
                _ => {
                    error!(status = %status, "OpenAI API error: {}", text);
                    LlmError::InvalidResponse(format!("API error {}: {}", status, text))
                }
            });
        }

        let openai_response: OpenAIResponse = response.json().await?;
        Ok(parse_openai_response(openai_response))
    }
}

// === OpenAI API Types ===

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: Option<OpenAIMessage>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
