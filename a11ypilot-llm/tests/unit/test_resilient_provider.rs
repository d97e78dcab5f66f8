//! Unit tests for ResilientProvider

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use a11ypilot_core::config::LlmResilienceConfig;
use a11ypilot_llm::domain::{
    CompletionRequest, CompletionResponse, LlmError, LlmProvider, ProviderInfo,
};
use a11ypilot_llm::ResilientProvider;
use async_trait::async_trait;

#[allow(dead_code)]
mod common {
    include!("../common/mod.rs");
}

use common::create_completion_response;

/// Fails the first `failures` calls with `error`, then succeeds
struct ScriptedProvider {
    failures: usize,
    error: LlmError,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    fn new(failures: usize, error: LlmError) -> Self {
        Self {
            failures,
            error,
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            id: "scripted",
            name: "Scripted Provider",
        }
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            Err(self.error.clone())
        } else {
            Ok(create_completion_response("ok"))
        }
    }
}

fn test_config() -> LlmResilienceConfig {
    LlmResilienceConfig {
        enabled: true,
        max_retries: 2,
        initial_backoff_ms: 10,
        max_backoff_ms: 100,
        circuit_breaker_threshold: 2,
        circuit_breaker_timeout_secs: 30,
        half_open_max_requests: 1,
    }
}

fn request() -> CompletionRequest {
    CompletionRequest::new().with_user("hello")
}

#[tokio::test(start_paused = true)]
async fn test_retries_transient_error_then_succeeds() {
    let inner = Arc::new(ScriptedProvider::new(
        2,
        LlmError::ServiceUnavailable("overloaded".to_string()),
    ));
    let provider = ResilientProvider::new(inner.clone(), test_config());

    let response = provider.complete(request()).await.unwrap();

    assert_eq!(response.text(), "ok");
    assert_eq!(inner.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_gives_up_after_max_retries() {
    let inner = Arc::new(ScriptedProvider::new(10, LlmError::network("connection reset")));
    let provider = ResilientProvider::new(inner.clone(), test_config());

    let result = provider.complete(request()).await;

    assert!(matches!(result, Err(LlmError::Network(_))));
    assert_eq!(inner.call_count(), 3);
}

#[tokio::test]
async fn test_non_retryable_error_is_not_retried() {
    let inner = Arc::new(ScriptedProvider::new(1, LlmError::auth("invalid key")));
    let provider = ResilientProvider::new(inner.clone(), test_config());

    let result = provider.complete(request()).await;

    assert!(matches!(result, Err(LlmError::Authentication(_))));
    assert_eq!(inner.call_count(), 1);
}

#[tokio::test]
async fn test_circuit_opens_after_threshold() {
    let inner = Arc::new(ScriptedProvider::new(usize::MAX, LlmError::auth("invalid key")));
    let provider = ResilientProvider::new(inner.clone(), test_config());

    for _ in 0..2 {
        assert!(provider.complete(request()).await.is_err());
    }
    let result = provider.complete(request()).await;

    assert!(matches!(result, Err(LlmError::CircuitOpen { ref circuit }) if circuit == "scripted"));
    assert_eq!(inner.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_half_open_after_cooldown_closes_on_success() {
    let inner = Arc::new(ScriptedProvider::new(2, LlmError::auth("invalid key")));
    let provider = ResilientProvider::new(inner.clone(), test_config());

    for _ in 0..2 {
        assert!(provider.complete(request()).await.is_err());
    }
    assert!(matches!(
        provider.complete(request()).await,
        Err(LlmError::CircuitOpen { .. })
    ));

    tokio::time::advance(Duration::from_secs(31)).await;

    let trial = provider.complete(request()).await;
    assert!(trial.is_ok());
    assert_eq!(inner.call_count(), 3);

    // Closed again: requests flow without a cooldown
    assert!(provider.complete(request()).await.is_ok());
    assert_eq!(inner.call_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_half_open_failure_reopens_circuit() {
    let inner = Arc::new(ScriptedProvider::new(usize::MAX, LlmError::auth("invalid key")));
    let provider = ResilientProvider::new(inner.clone(), test_config());

    for _ in 0..2 {
        assert!(provider.complete(request()).await.is_err());
    }
    tokio::time::advance(Duration::from_secs(31)).await;

    assert!(matches!(
        provider.complete(request()).await,
        Err(LlmError::Authentication(_))
    ));
    assert!(matches!(
        provider.complete(request()).await,
        Err(LlmError::CircuitOpen { .. })
    ));
    assert_eq!(inner.call_count(), 3);
}
