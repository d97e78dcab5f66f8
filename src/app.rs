//! Application setup and wiring

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use a11ypilot_core::Config;
use a11ypilot_core::domain::audit::{
    AggregatedScan, Framework, PrioritySummary, RemediationPlan,
    RepositoryError, ScanContext, ScanOptions, ScanRepository, ScanResult, SiteContext,
    UsageGate, UsageRejected, Violation,
};
use a11ypilot_core::infrastructure::{AllowAllUsage, InMemoryScanRepository};
use a11ypilot_llm::{
    GenerateFixesUseCase, LlmError, LlmProvider, ProviderRegistry, ScoreViolationsUseCase,
    apply_analyses,
};
use a11ypilot_scan::{
    CrawlUseCase, FrameworkDetector, HeuristicSuite, HttpPageRenderer, PageRenderer,
    RemoteRuleEvaluator, RuleEvaluator, ScanError, ScanPageUseCase, ScanSettings, aggregate,
    parse_target_url,
};

/// Failure of an audit request that reaches the caller
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Rejected(#[from] UsageRejected),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("Failed to initialize {component}: {message}")]
    Setup {
        component: &'static str,
        message: String,
    },
}

impl PipelineError {
    fn setup(component: &'static str, message: impl ToString) -> Self {
        Self::Setup {
            component,
            message: message.to_string(),
        }
    }

    /// Message suitable for showing to the person who asked for the audit
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::Rejected(rejected) => {
                format!("The scan request was not accepted: {}", rejected.reason)
            }
            PipelineError::Scan(e) => e.user_message(),
            PipelineError::Setup { component, message } => {
                format!("a11ypilot is misconfigured ({}): {}", component, message)
            }
        }
    }
}

impl From<LlmError> for PipelineError {
    fn from(e: LlmError) -> Self {
        Self::setup("reasoning provider", e)
    }
}

/// Everything the pipeline talks to, supplied by the caller
pub struct Collaborators {
    pub renderer: Arc<dyn PageRenderer>,
    pub evaluator: Arc<dyn RuleEvaluator>,
    /// `None` sends scoring and fixes straight to their deterministic paths
    pub provider: Option<Arc<dyn LlmProvider>>,
    pub repository: Arc<dyn ScanRepository>,
    pub usage: Arc<dyn UsageGate>,
}

impl Collaborators {
    /// HTTP renderer, remote evaluator, configured provider, in-memory storage, no quota
    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        let renderer = HttpPageRenderer::new(&config.renderer)
            .map_err(|e| PipelineError::setup("page renderer", e))?;
        let evaluator = RemoteRuleEvaluator::new(&config.evaluator)
            .map_err(|e| PipelineError::setup("rule evaluator", e))?;
        let provider = ProviderRegistry::from_llm_config(&config.llm)?;

        Ok(Self {
            renderer: Arc::new(renderer),
            evaluator: Arc::new(evaluator),
            provider,
            repository: Arc::new(InMemoryScanRepository::new()),
            usage: Arc::new(AllowAllUsage),
        })
    }
}

/// End-to-end audit: usage gate, crawl, aggregate, score, fixes, persist
pub struct AuditPipeline {
    scanner: Arc<ScanPageUseCase>,
    crawl: CrawlUseCase,
    detector: FrameworkDetector,
    scoring: ScoreViolationsUseCase,
    fixes: GenerateFixesUseCase,
    repository: Arc<dyn ScanRepository>,
    usage: Arc<dyn UsageGate>,
}

/// Build the pipeline with the collaborators described by `config`
pub fn create_pipeline(config: &Config) -> Result<AuditPipeline, PipelineError> {
    let collaborators = Collaborators::from_config(config)?;
    Ok(AuditPipeline::new(collaborators, config))
}

impl AuditPipeline {
    pub fn new(collaborators: Collaborators, config: &Config) -> Self {
        let settings = ScanSettings::from_config(&config.renderer, &config.evaluator);
        Self::with_settings(collaborators, config, settings)
    }

    /// Like [`AuditPipeline::new`] with explicit scan timing
    pub fn with_settings(collaborators: Collaborators, config: &Config, settings: ScanSettings) -> Self {
        let Collaborators {
            renderer,
            evaluator,
            provider,
            repository,
            usage,
        } = collaborators;

        let detector = FrameworkDetector::new(Arc::clone(&renderer), settings.navigation_timeout);
        let scanner = Arc::new(ScanPageUseCase::new(
            renderer,
            evaluator,
            HeuristicSuite::standard(),
            settings,
        ));

        Self {
            crawl: CrawlUseCase::new(Arc::clone(&scanner), &config.crawl),
            scanner,
            detector,
            scoring: ScoreViolationsUseCase::new(provider.clone(), config.llm.clone()),
            fixes: GenerateFixesUseCase::new(provider, config.llm.clone()),
            repository,
            usage,
        }
    }

    /// Crawl from `url` and turn the findings into a remediation plan.
    ///
    /// Only a rejected request, invalid input or a failed seed page is an
    /// error; scoring, fixes and storage always degrade instead.
    #[instrument(skip(self, options, site, cancel), fields(url = %url))]
    pub async fn run(
        &self,
        url: &str,
        options: &ScanOptions,
        site: &SiteContext,
        cancel: CancellationToken,
    ) -> Result<RemediationPlan, PipelineError> {
        self.usage.check(url).await?;
        let seed = parse_target_url(url)?;
        let started = Instant::now();

        let pages = self.crawl.execute(&seed, options, cancel).await?;
        let mut scan = aggregate(&seed, &pages, started.elapsed().as_millis() as u64);

        let outcome = self.scoring.execute(&scan.violations, site).await;
        apply_analyses(&mut scan.violations, &outcome.analyses);

        let context = ScanContext {
            framework: options.framework,
            detected_frameworks: pages.iter().map(|page| page.metadata.framework).collect(),
            url: Some(scan.url.clone()),
        };
        let fixes = self.fixes.execute(&scan.violations, &context).await;

        if let Err(e) = self.repository.save(&scan).await {
            warn!(scan_id = %scan.id, error = %e, "Failed to persist scan, continuing");
        }

        let plan = RemediationPlan {
            ordered_violation_ids: remediation_order(&scan.violations),
            summary: PrioritySummary::from_analyses(&outcome.analyses),
            scoring_source: outcome.source,
            fixes,
            scan,
        };

        info!(
            pages = plan.scan.pages_scanned,
            violations = plan.scan.violations.len(),
            score = plan.scan.accessibility_score,
            critical = plan.summary.critical,
            "Audit completed"
        );
        Ok(plan)
    }

    /// Scan one page without crawling, scoring or storing
    pub async fn scan_page(&self, url: &str, options: &ScanOptions) -> Result<ScanResult, PipelineError> {
        self.usage.check(url).await?;
        let target = parse_target_url(url)?;
        Ok(self.scanner.execute(&target, options).await?)
    }

    /// Framework fingerprint of one page; unreachable pages report vanilla
    pub async fn detect(&self, url: &str) -> Result<Framework, PipelineError> {
        let target = parse_target_url(url)?;
        Ok(self.detector.detect(&target).await)
    }

    /// A previously stored aggregate scan
    pub async fn stored_scan(&self, id: &Uuid) -> Result<Option<AggregatedScan>, RepositoryError> {
        self.repository.get(id).await
    }
}

/// Violation ids by priority score, highest first; ties keep scan order
fn remediation_order(violations: &[Violation]) -> Vec<String> {
    let mut ranked: Vec<&Violation> = violations.iter().collect();
    ranked.sort_by(|a, b| {
        b.priority_score
            .unwrap_or(0.0)
            .total_cmp(&a.priority_score.unwrap_or(0.0))
    });
    ranked.into_iter().map(|v| v.id.clone()).collect()
}
