//! Ports to the page renderer and the external rule evaluator

use async_trait::async_trait;
use url::Url;

use a11ypilot_core::domain::audit::{PerformanceMetrics, Viewport, Violation};

use super::errors::{NavigationError, RuleEvaluationError, SamplingError};

/// Rendered state of one page, taken once the page has settled
#[derive(Debug, Clone, PartialEq)]
pub struct DomSnapshot {
    /// Final URL after redirects
    pub url: Url,
    pub html: String,
    /// Text of linked stylesheets; inline `<style>` blocks stay in `html`
    pub stylesheets: Vec<String>,
    pub title: String,
    pub user_agent: String,
    pub viewport: Viewport,
}

impl DomSnapshot {
    /// Snapshot with default metadata, used by detectors and tests
    pub fn from_html(url: Url, html: impl Into<String>) -> Self {
        Self {
            url,
            html: html.into(),
            stylesheets: Vec::new(),
            title: String::new(),
            user_agent: String::new(),
            viewport: Viewport::default(),
        }
    }

    pub fn with_stylesheet(mut self, css: impl Into<String>) -> Self {
        self.stylesheets.push(css.into());
        self
    }
}

/// One isolated browsing context holding a loaded page
///
/// Every page returned by [`PageRenderer::open`] must be closed by its owner.
#[async_trait]
pub trait RenderedPage: Send + Sync {
    fn snapshot(&self) -> &DomSnapshot;

    /// Timing and weight of the page load
    async fn sample_performance(&self) -> Result<PerformanceMetrics, SamplingError>;

    /// Tear down the browsing context
    async fn close(self: Box<Self>);
}

/// Loads pages into isolated browsing contexts
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Navigate to `url` and wait for the network to go idle
    async fn open(&self, url: &Url) -> Result<Box<dyn RenderedPage>, NavigationError>;
}

/// Raw output of the rule evaluator for one page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleEvaluation {
    pub violations: Vec<Violation>,
    pub passes: Vec<Violation>,
    pub incomplete: Vec<Violation>,
}

/// External WCAG rule-checking capability
#[async_trait]
pub trait RuleEvaluator: Send + Sync {
    /// Evaluate a rendered page against rules matching `tags`
    async fn evaluate(
        &self,
        snapshot: &DomSnapshot,
        tags: &[String],
    ) -> Result<RuleEvaluation, RuleEvaluationError>;
}
