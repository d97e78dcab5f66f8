// Common test utilities and mock implementations

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use a11ypilot_core::config::LlmConfig;
use a11ypilot_core::domain::audit::{Impact, Violation, ViolationNode};
use a11ypilot_llm::domain::{
    CompletionRequest, CompletionResponse, LlmError, LlmProvider, ProviderInfo, StopReason, Usage,
};
use async_trait::async_trait;
use tokio::sync::Mutex;

/// Mock reasoning provider
pub struct MockLlmProvider {
    /// Text returned from complete()
    pub response: Option<String>,
    /// Error to return (if any)
    pub error: Option<LlmError>,
    /// Fail any request whose user prompt contains one of these markers
    pub fail_when_prompt_contains: Vec<String>,
    /// Sleep before answering
    pub delay: Option<Duration>,
    pub captured_requests: Arc<Mutex<Vec<CompletionRequest>>>,
    pub calls: AtomicUsize,
}

impl MockLlmProvider {
    pub fn new() -> Self {
        Self {
            response: None,
            error: None,
            fail_when_prompt_contains: Vec::new(),
            delay: None,
            captured_requests: Arc::new(Mutex::new(Vec::new())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_text_response(content: &str) -> Self {
        let mut mock = Self::new();
        mock.response = Some(content.to_string());
        mock
    }

    pub fn with_error(mut self, error: LlmError) -> Self {
        self.error = Some(error);
        self
    }

    pub fn failing_when_prompt_contains(mut self, marker: &str) -> Self {
        self.fail_when_prompt_contains.push(marker.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            id: "mock",
            name: "Mock Provider",
        }
    }

    fn default_model(&self) -> &str {
        "test-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let prompt = request
            .messages
            .iter()
            .map(|m| m.content.clone())
            .collect::<Vec<_>>()
            .join("\n");
        self.captured_requests.lock().await.push(request);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        if self
            .fail_when_prompt_contains
            .iter()
            .any(|marker| prompt.contains(marker))
        {
            return Err(LlmError::ServiceUnavailable("scripted failure".to_string()));
        }

        self.response
            .as_deref()
            .map(create_completion_response)
            .ok_or_else(|| LlmError::Other("No response configured".to_string()))
    }
}

pub fn create_completion_response(content: &str) -> CompletionResponse {
    CompletionResponse {
        id: "test-response-id".to_string(),
        model: "test-model".to_string(),
        content: content.to_string(),
        stop_reason: StopReason::EndTurn,
        usage: Usage {
            prompt_tokens: 100,
            completion_tokens: 50,
            total_tokens: 150,
        },
    }
}

/// LlmConfig with a short call timeout and small fix batches
pub fn create_test_config() -> LlmConfig {
    let mut config = LlmConfig::default();
    config.openai.api_key = Some("test-openai-key".to_string());
    config.default_model = "test-model".to_string();
    config.scoring_model = Some("scoring-model".to_string());
    config.code_fix_model = Some("code-fix-model".to_string());
    config.timeout_seconds = 2;
    config.fixes.batch_size = 3;
    config.fixes.max_concurrent_batches = 2;
    config
}

pub fn violation(id: &str, description: &str, impact: Impact, wcag: &str) -> Violation {
    Violation::new(id, description, impact, wcag)
        .with_node(ViolationNode::new(format!("<div id=\"{}\"></div>", id), format!("#{}", id)))
}

/// A mixed set of six violations
pub fn sample_violations() -> Vec<Violation> {
    vec![
        violation("axe:color-contrast", "Elements must meet minimum color contrast ratio thresholds", Impact::Serious, "WCAG 1.4.3"),
        violation("heuristic:form-control-name", "Form control has no accessible name", Impact::Serious, "WCAG 3.3.2"),
        violation("heuristic:focus-visible", "No visible focus indicator is defined", Impact::Serious, "WCAG 2.4.7"),
        violation("axe:aria-allowed-attr", "ARIA attributes must be allowed for an element's role", Impact::Critical, "WCAG 4.1.2"),
        violation("heuristic:bypass-blocks", "Page has no skip link or main landmark", Impact::Moderate, "WCAG 2.4.1"),
        violation("axe:list", "Lists must only directly contain li elements", Impact::Minor, "WCAG 1.3.1"),
    ]
}
