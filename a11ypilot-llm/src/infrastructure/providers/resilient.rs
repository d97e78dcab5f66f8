//! Resilient provider wrapper
//!
//! Adds a circuit breaker and retry with exponential backoff to any provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

use a11ypilot_core::config::LlmResilienceConfig;

use crate::domain::{CompletionRequest, CompletionResponse, LlmError, LlmProvider, ProviderInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

struct CircuitBreakerState {
    state: CircuitState,
    failure_count: u32,
    last_failure_time: Option<Instant>,
    half_open_requests: u32,
}

/// Wraps a provider with retry and a closed / open / half-open circuit breaker
///
/// ```rust,ignore
/// let inner: Arc<dyn LlmProvider> = Arc::new(OpenAIProvider::new("key", "gpt-4o-mini"));
/// let provider = ResilientProvider::new(inner, config.llm.resilience.clone());
/// ```
pub struct ResilientProvider {
    inner: Arc<dyn LlmProvider>,
    config: LlmResilienceConfig,
    circuit_state: Mutex<CircuitBreakerState>,
}

impl ResilientProvider {
    pub fn new(inner: Arc<dyn LlmProvider>, config: LlmResilienceConfig) -> Self {
        Self {
            inner,
            config,
            circuit_state: Mutex::new(CircuitBreakerState {
                state: CircuitState::Closed,
                failure_count: 0,
                last_failure_time: None,
                half_open_requests: 0,
            }),
        }
    }

    fn circuit_open(&self) -> LlmError {
        LlmError::CircuitOpen {
            circuit: self.inner.info().id.to_string(),
        }
    }

    async fn can_execute(&self) -> Result<(), LlmError> {
        let mut state = self.circuit_state.lock().await;

        match state.state {
            CircuitState::Closed => Ok(()),
            CircuitState::Open => {
                let cooled_down = state.last_failure_time.is_some_and(|at| {
                    at.elapsed() >= Duration::from_secs(self.config.circuit_breaker_timeout_secs)
                });
                if cooled_down {
                    debug!("Circuit breaker transitioning to half-open");
                    state.state = CircuitState::HalfOpen;
                    state.half_open_requests = 1;
                    Ok(())
                } else {
                    Err(self.circuit_open())
                }
            }
            CircuitState::HalfOpen => {
                if state.half_open_requests < self.config.half_open_max_requests {
                    state.half_open_requests += 1;
                    Ok(())
                } else {
                    Err(self.circuit_open())
                }
            }
        }
    }

    async fn on_success(&self) {
        let mut state = self.circuit_state.lock().await;
        if state.state == CircuitState::HalfOpen {
            debug!("Circuit breaker closing after successful request in half-open state");
        }
        state.state = CircuitState::Closed;
        state.failure_count = 0;
        state.half_open_requests = 0;
    }

    async fn on_failure(&self) {
        let mut state = self.circuit_state.lock().await;

        state.failure_count += 1;
        state.last_failure_time = Some(Instant::now());

        match state.state {
            CircuitState::Closed if state.failure_count >= self.config.circuit_breaker_threshold => {
                warn!(
                    failures = state.failure_count,
                    threshold = self.config.circuit_breaker_threshold,
                    "Circuit breaker opening due to failures"
                );
                state.state = CircuitState::Open;
            }
            CircuitState::HalfOpen => {
                debug!("Circuit breaker reopening after failure in half-open state");
                state.state = CircuitState::Open;
                state.half_open_requests = 0;
            }
            _ => {}
        }
    }

    async fn execute_with_retry(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, LlmError> {
        let mut backoff = self.config.initial_backoff_ms;
        let mut attempt = 0;

        loop {
            match self.inner.complete(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(e) if !e.is_retryable() || attempt >= self.config.max_retries => return Err(e),
                Err(e) => {
                    // Honor retry-after when the provider sends one
                    let wait = e
                        .retry_after()
                        .map(|d| d.as_millis() as u64)
                        .filter(|ms| *ms < self.config.max_backoff_ms)
                        .unwrap_or(backoff);

                    attempt += 1;
                    debug!(attempt, backoff_ms = wait, error = %e, "Retrying LLM request");
                    sleep(Duration::from_millis(wait)).await;

                    backoff = (backoff * 2 + rand_jitter(backoff / 4)).min(self.config.max_backoff_ms);
                }
            }
        }
    }
}

/// Spread retries from concurrent callers
fn rand_jitter(max: u64) -> u64 {
    use std::time::SystemTime;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    (nanos as u64) % max.max(1)
}

#[async_trait]
impl LlmProvider for ResilientProvider {
    fn info(&self) -> ProviderInfo {
        self.inner.info()
    }

    fn default_model(&self) -> &str {
        self.inner.default_model()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.can_execute().await?;

        match self.execute_with_retry(request).await {
            Ok(response) => {
                self.on_success().await;
                Ok(response)
            }
            Err(e) => {
                self.on_failure().await;
                Err(e)
            }
        }
    }
}
