// Common test utilities and mock implementations

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use url::Url;

use a11ypilot_core::domain::audit::{Impact, PerformanceMetrics, Viewport, Violation, ViolationNode};
use a11ypilot_scan::{
    DomSnapshot, NavigationError, PageRenderer, RenderedPage, RuleEvaluation, RuleEvaluationError,
    RuleEvaluator, SamplingError, ScanSettings,
};

/// How the mock renderer answers for one URL
#[derive(Clone)]
pub enum PageBehavior {
    Html(String),
    Fail(NavigationError),
    /// Never finishes navigating
    Hang,
}

/// Mock page renderer keyed by URL
pub struct MockRenderer {
    pages: HashMap<String, PageBehavior>,
    pub opened: Arc<AtomicUsize>,
    pub closed: Arc<AtomicUsize>,
    pub sampling_fails: bool,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            opened: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
            sampling_fails: false,
        }
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages
            .insert(normalize(url), PageBehavior::Html(html.to_string()));
        self
    }

    pub fn with_behavior(mut self, url: &str, behavior: PageBehavior) -> Self {
        self.pages.insert(normalize(url), behavior);
        self
    }

    pub fn with_failing_sampling(mut self) -> Self {
        self.sampling_fails = true;
        self
    }

    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
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
        match self.pages.get(url.as_str()).cloned() {
            Some(PageBehavior::Html(html)) => {
                self.opened.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(MockPage {
                    snapshot: DomSnapshot {
                        url: url.clone(),
                        html,
                        stylesheets: Vec::new(),
                        title: "Mock page".to_string(),
                        user_agent: "a11ypilot-test".to_string(),
                        viewport: Viewport::default(),
                    },
                    closed: Arc::clone(&self.closed),
                    sampling_fails: self.sampling_fails,
                }))
            }
            Some(PageBehavior::Fail(error)) => Err(error),
            Some(PageBehavior::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(NavigationError::timeout(url.as_str(), 3600))
            }
            None => Err(NavigationError::unreachable(url.as_str(), "no such mock page")),
        }
    }
}

pub struct MockPage {
    snapshot: DomSnapshot,
    closed: Arc<AtomicUsize>,
    sampling_fails: bool,
}

#[async_trait]
impl RenderedPage for MockPage {
    fn snapshot(&self) -> &DomSnapshot {
        &self.snapshot
    }

    async fn sample_performance(&self) -> Result<PerformanceMetrics, SamplingError> {
        if self.sampling_fails {
            return Err(SamplingError("timing API unavailable".to_string()));
        }
        Ok(PerformanceMetrics {
            time_to_first_byte_ms: 120,
            load_time_ms: 800,
            document_bytes: self.snapshot.html.len() as u64,
            stylesheet_bytes: 0,
            resource_count: 1,
            dom_node_count: 10,
            performance_score: 100.0,
        })
    }

    async fn close(self: Box<Self>) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Mock rule evaluator returning fixed violations, or an error
pub struct MockEvaluator {
    pub violations: Vec<Violation>,
    pub error: Option<RuleEvaluationError>,
    pub captured_urls: Arc<Mutex<Vec<String>>>,
}

impl MockEvaluator {
    pub fn new() -> Self {
        Self {
            violations: Vec::new(),
            error: None,
            captured_urls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_violations(mut self, violations: Vec<Violation>) -> Self {
        self.violations = violations;
        self
    }

    pub fn with_error(mut self, error: RuleEvaluationError) -> Self {
        self.error = Some(error);
        self
    }
}

#[async_trait]
impl RuleEvaluator for MockEvaluator {
    async fn evaluate(
        &self,
        snapshot: &DomSnapshot,
        _tags: &[String],
    ) -> Result<RuleEvaluation, RuleEvaluationError> {
        self.captured_urls.lock().await.push(snapshot.url.to_string());
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        Ok(RuleEvaluation {
            violations: self.violations.clone(),
            passes: vec![Violation::new("axe:document-title", "Document has a title", Impact::Unknown, "WCAG 2.4.2")],
            incomplete: Vec::new(),
        })
    }
}

/// Settings with no settle delay and a short navigation timeout
pub fn fast_settings() -> ScanSettings {
    ScanSettings {
        navigation_timeout: Duration::from_millis(200),
        settle_delay: Duration::ZERO,
        rule_tags: vec!["wcag2a".to_string()],
    }
}

pub fn axe_violation(rule: &str, description: &str, impact: Impact, wcag: &str) -> Violation {
    Violation::new(format!("axe:{}", rule), description, impact, wcag)
        .with_tag("axe")
        .with_node(ViolationNode::new("<div></div>", "div"))
}

/// Page with a single unlabeled text input and nothing else of note
pub const UNLABELED_INPUT_PAGE: &str = r#"<!doctype html>
<html lang="en"><head><title>Signup</title></head>
<body><form action="/signup"><input type="text" name="email"></form></body></html>"#;
