//! Single-page scan orchestration

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use url::Url;

use a11ypilot_core::config::{EvaluatorConfig, RendererConfig};
use a11ypilot_core::domain::audit::{ScanMetadata, ScanOptions, ScanResult};

use crate::domain::{NavigationError, PageRenderer, RenderedPage, RuleEvaluator, ScanError};
use crate::infrastructure::{HeuristicSuite, detect_in_snapshot, merge_violations};

/// Timing and rule selection for page scans
#[derive(Debug, Clone)]
pub struct ScanSettings {
    /// Upper bound on one page navigation
    pub navigation_timeout: Duration,
    /// Wait applied after navigation, before inspection
    pub settle_delay: Duration,
    /// Tags forwarded to the rule evaluator
    pub rule_tags: Vec<String>,
}

impl ScanSettings {
    pub fn from_config(renderer: &RendererConfig, evaluator: &EvaluatorConfig) -> Self {
        Self {
            navigation_timeout: renderer.navigation_timeout(),
            settle_delay: renderer.settle_delay(),
            rule_tags: evaluator.tags.clone(),
        }
    }
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self::from_config(&RendererConfig::default(), &EvaluatorConfig::default())
    }
}

/// Scans one page: render, evaluate rules, run heuristics, merge
pub struct ScanPageUseCase {
    renderer: Arc<dyn PageRenderer>,
    evaluator: Arc<dyn RuleEvaluator>,
    heuristics: HeuristicSuite,
    settings: ScanSettings,
}

impl ScanPageUseCase {
    pub fn new(
        renderer: Arc<dyn PageRenderer>,
        evaluator: Arc<dyn RuleEvaluator>,
        heuristics: HeuristicSuite,
        settings: ScanSettings,
    ) -> Self {
        Self {
            renderer,
            evaluator,
            heuristics,
            settings,
        }
    }

    pub fn renderer(&self) -> &Arc<dyn PageRenderer> {
        &self.renderer
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    /// Open `url` within the navigation timeout
    pub async fn open_page(&self, url: &Url) -> Result<Box<dyn RenderedPage>, NavigationError> {
        match tokio::time::timeout(self.settings.navigation_timeout, self.renderer.open(url)).await {
            Ok(result) => result,
            Err(_) => Err(NavigationError::timeout(
                url.as_str(),
                self.settings.navigation_timeout.as_secs(),
            )),
        }
    }

    pub async fn execute(&self, url: &Url, options: &ScanOptions) -> Result<ScanResult, ScanError> {
        self.execute_until(url, options, &CancellationToken::new()).await
    }

    /// Scan `url` unless `cancel` fires first.
    ///
    /// Once the page is open it is closed before returning, on success,
    /// failure and cancellation alike.
    #[instrument(skip(self, options, cancel), fields(url = %url))]
    pub async fn execute_until(
        &self,
        url: &Url,
        options: &ScanOptions,
        cancel: &CancellationToken,
    ) -> Result<ScanResult, ScanError> {
        let started = Instant::now();
        let timestamp = Utc::now();

        let page = tokio::select! {
            _ = cancel.cancelled() => return Err(ScanError::Cancelled),
            opened = self.open_page(url) => opened?,
        };

        let outcome = tokio::select! {
            _ = cancel.cancelled() => Err(ScanError::Cancelled),
            outcome = self.settle_and_inspect(page.as_ref(), options) => outcome,
        };
        page.close().await;

        let mut result = outcome?;
        result.url = url.to_string();
        result.timestamp = timestamp;
        result.scan_duration_ms = started.elapsed().as_millis() as u64;

        info!(
            violations = result.violations.len(),
            passes = result.passes.len(),
            duration_ms = result.scan_duration_ms,
            "Page scan completed"
        );
        Ok(result)
    }

    async fn settle_and_inspect(
        &self,
        page: &dyn RenderedPage,
        options: &ScanOptions,
    ) -> Result<ScanResult, ScanError> {
        if !self.settings.settle_delay.is_zero() {
            tokio::time::sleep(self.settings.settle_delay).await;
        }
        self.inspect(page, options).await
    }

    async fn inspect(&self, page: &dyn RenderedPage, options: &ScanOptions) -> Result<ScanResult, ScanError> {
        let snapshot = page.snapshot();
        let framework = options
            .framework
            .forced()
            .unwrap_or_else(|| detect_in_snapshot(snapshot));

        let evaluation = self
            .evaluator
            .evaluate(snapshot, &self.settings.rule_tags)
            .await?;

        let heuristic_findings = if options.custom_rules {
            self.heuristics.run(snapshot, framework)
        } else {
            Vec::new()
        };
        debug!(
            rule_violations = evaluation.violations.len(),
            heuristic_findings = heuristic_findings.len(),
            framework = %framework,
            "Merging findings"
        );

        let performance_metrics = if options.include_performance {
            match page.sample_performance().await {
                Ok(metrics) => Some(metrics),
                Err(e) => {
                    warn!(url = %snapshot.url, error = %e, "Performance sampling failed, continuing without metrics");
                    None
                }
            }
        } else {
            None
        };

        Ok(ScanResult {
            url: snapshot.url.to_string(),
            timestamp: Utc::now(),
            scan_duration_ms: 0,
            violations: merge_violations(evaluation.violations, heuristic_findings),
            passes: evaluation.passes,
            incomplete: evaluation.incomplete,
            metadata: ScanMetadata {
                title: snapshot.title.clone(),
                user_agent: snapshot.user_agent.clone(),
                viewport: snapshot.viewport,
                framework,
            },
            performance_metrics,
        })
    }
}
