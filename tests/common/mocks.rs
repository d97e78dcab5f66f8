//! Mock collaborators injected into the pipeline

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use url::Url;
use uuid::Uuid;

use a11ypilot::a11ypilot_core::domain::audit::{
    AggregatedScan, PerformanceMetrics, RepositoryError, ScanRepository, UsageGate, UsageRejected,
    Viewport, Violation,
};
use a11ypilot::a11ypilot_scan::{
    DomSnapshot, NavigationError, PageRenderer, RenderedPage, RuleEvaluation, RuleEvaluationError,
    RuleEvaluator, SamplingError,
};

/// Renderer serving fixed HTML per URL; unknown URLs fail or are unreachable
pub struct MockRenderer {
    pages: HashMap<String, Result<String, NavigationError>>,
    pub closed: Arc<AtomicUsize>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(normalize(url), Ok(html.to_string()));
        self
    }

    pub fn with_failure(mut self, url: &str, error: NavigationError) -> Self {
        self.pages.insert(normalize(url), Err(error));
        self
    }

    pub fn close_count(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

fn normalize(url: &str) -> String {
    Url::parse(url).map(|u| u.to_string()).unwrap_or_else(|_| url.to_string())
}

#[async_trait]
impl PageRenderer for MockRenderer {
    async fn open(&self, url: &Url) -> Result<Box<dyn RenderedPage>, NavigationError> {
        match self.pages.get(url.as_str()) {
            Some(Ok(html)) => Ok(Box::new(MockPage {
                snapshot: DomSnapshot {
                    url: url.clone(),
                    html: html.clone(),
                    stylesheets: Vec::new(),
                    title: "Mock page".to_string(),
                    user_agent: "a11ypilot-test".to_string(),
                    viewport: Viewport::default(),
                },
                closed: Arc::clone(&self.closed),
            })),
            Some(Err(error)) => Err(error.clone()),
            None => Err(NavigationError::unreachable(url.as_str(), "no such mock page")),
        }
    }
}

pub struct MockPage {
    snapshot: DomSnapshot,
    closed: Arc<AtomicUsize>,
}

#[async_trait]
impl RenderedPage for MockPage {
    fn snapshot(&self) -> &DomSnapshot {
        &self.snapshot
    }

    async fn sample_performance(&self) -> Result<PerformanceMetrics, SamplingError> {
        Ok(PerformanceMetrics {
            load_time_ms: 900,
            performance_score: 100.0,
            ..Default::default()
        })
    }

    async fn close(self: Box<Self>) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Evaluator returning the same violations for every page
pub struct MockEvaluator {
    pub violations: Vec<Violation>,
}

impl MockEvaluator {
    pub fn empty() -> Self {
        Self {
            violations: Vec::new(),
        }
    }

    pub fn with_violations(violations: Vec<Violation>) -> Self {
        Self { violations }
    }
}

#[async_trait]
impl RuleEvaluator for MockEvaluator {
    async fn evaluate(
        &self,
        _snapshot: &DomSnapshot,
        _tags: &[String],
    ) -> Result<RuleEvaluation, RuleEvaluationError> {
        Ok(RuleEvaluation {
            violations: self.violations.clone(),
            passes: Vec::new(),
            incomplete: Vec::new(),
        })
    }
}

/// Repository that records saves, or fails every call
pub struct MockRepository {
    pub saved: Mutex<Vec<AggregatedScan>>,
    pub fail: bool,
}

impl MockRepository {
    pub fn new() -> Self {
        Self {
            saved: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            saved: Mutex::new(Vec::new()),
            fail: true,
        }
    }
}

#[async_trait]
impl ScanRepository for MockRepository {
    async fn save(&self, scan: &AggregatedScan) -> Result<(), RepositoryError> {
        if self.fail {
            return Err(RepositoryError::Unavailable("database offline".to_string()));
        }
        self.saved.lock().await.push(scan.clone());
        Ok(())
    }

    async fn get(&self, id: &Uuid) -> Result<Option<AggregatedScan>, RepositoryError> {
        if self.fail {
            return Err(RepositoryError::Unavailable("database offline".to_string()));
        }
        Ok(self.saved.lock().await.iter().find(|s| &s.id == id).cloned())
    }
}

/// Usage gate that rejects everything
pub struct RejectAllUsage;

#[async_trait]
impl UsageGate for RejectAllUsage {
    async fn check(&self, _url: &str) -> Result<(), UsageRejected> {
        Err(UsageRejected::new("monthly scan quota reached"))
    }
}
