//! End-to-end audit pipeline tests with mock collaborators

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use a11ypilot::a11ypilot_core::domain::audit::{
    FixFramework, Framework, Impact, Priority, Provenance, ScanOptions, SiteContext, Violation, ViolationNode,
};
use a11ypilot::a11ypilot_core::infrastructure::AllowAllUsage;
use a11ypilot::a11ypilot_scan::{NavigationError, ScanError};
use a11ypilot::{AuditPipeline, PipelineError};

#[path = "../common/mod.rs"]
#[allow(dead_code)]
mod common;

use common::{
    MockEvaluator, MockRenderer, MockRepository, RejectAllUsage, UNLABELED_INPUT_PAGE,
    collaborators, fast_settings, offline_config, offline_pipeline,
};

const SEED: &str = "https://shop.test/";

#[tokio::test]
async fn test_unlabeled_input_is_scored_by_fallback() {
    let renderer = Arc::new(MockRenderer::new().with_page(SEED, UNLABELED_INPUT_PAGE));
    let (pipeline, repository) = offline_pipeline(renderer.clone(), Arc::new(MockEvaluator::empty()));

    let plan = pipeline
        .run(SEED, &ScanOptions::default(), &SiteContext::default(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(plan.scoring_source, Provenance::Fallback);
    assert_eq!(plan.scan.pages_scanned, 1);

    let label = plan
        .scan
        .violations
        .iter()
        .find(|v| v.wcag_reference == "WCAG 3.3.2")
        .expect("missing form label violation");
    assert_eq!(label.impact, Impact::Serious);
    assert_eq!(label.legal_risk_score, Some(6));
    assert_eq!(label.user_impact_score, Some(7));
    assert_eq!(label.priority, Some(Priority::High));

    assert!(plan.scan.violations.iter().all(Violation::is_scored));
    assert_eq!(plan.fixes.len(), plan.scan.violations.len());
    assert!(plan.fixes.iter().all(|f| !f.fixed_code.is_empty()));
    assert_eq!(plan.summary.total(), plan.scan.violations.len());
    assert_eq!(plan.ordered_violation_ids.len(), plan.scan.violations.len());

    assert_eq!(repository.saved.lock().await.len(), 1);
    let stored = pipeline.stored_scan(&plan.scan.id).await.unwrap();
    assert_eq!(stored.map(|s| s.id), Some(plan.scan.id));
    assert_eq!(renderer.close_count(), 1);
}

#[tokio::test]
async fn test_remediation_order_follows_priority() {
    let evaluator = MockEvaluator::with_violations(vec![
        Violation::new("axe:list", "Lists must only directly contain li elements", Impact::Minor, "WCAG 1.3.1")
            .with_node(ViolationNode::new("<ul><div></div></ul>", "ul")),
        Violation::new("axe:image-alt", "Images must have alternate text", Impact::Critical, "WCAG 1.1.1")
            .with_node(ViolationNode::new("<img src=\"a.png\">", "img")),
    ]);
    let renderer = Arc::new(MockRenderer::new().with_page(SEED, UNLABELED_INPUT_PAGE));
    let (pipeline, _) = offline_pipeline(renderer, Arc::new(evaluator));

    let options = ScanOptions {
        custom_rules: false,
        ..ScanOptions::default()
    };
    let plan = pipeline
        .run(SEED, &options, &SiteContext::default(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(plan.ordered_violation_ids, vec!["axe:image-alt", "axe:list"]);
    assert_eq!(plan.summary.critical, 1);
    assert_eq!(plan.summary.low, 1);
}

#[tokio::test]
async fn test_crawl_skips_failed_page() {
    let seed_html = r#"<html><body><main>
        <a href="/slow">Slow</a><a href="/about">About</a>
    </main></body></html>"#;
    let renderer = Arc::new(
        MockRenderer::new()
            .with_page(SEED, seed_html)
            .with_failure("https://shop.test/slow", NavigationError::timeout("https://shop.test/slow", 30))
            .with_page("https://shop.test/about", "<html><body><main><p>About</p></main></body></html>"),
    );
    let (pipeline, _) = offline_pipeline(renderer, Arc::new(MockEvaluator::empty()));

    let options = ScanOptions {
        max_pages: 3,
        crawl_depth: 1,
        ..ScanOptions::default()
    };
    let plan = pipeline
        .run(SEED, &options, &SiteContext::default(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(plan.scan.pages_scanned, 2);
    assert_eq!(plan.scan.pages[0].url, SEED);
    assert_eq!(plan.scan.pages[1].url, "https://shop.test/about");
}

#[tokio::test]
async fn test_fix_framework_follows_pages_beyond_seed() {
    let seed_html = r#"<html><body><main>
        <a href="/cart">Cart</a><a href="/checkout">Checkout</a>
    </main></body></html>"#;
    let vue_html = r#"<html><body><div id="app" data-v-7ba5bd90><main><p>Cart</p></main></div></body></html>"#;
    let renderer = Arc::new(
        MockRenderer::new()
            .with_page(SEED, seed_html)
            .with_page("https://shop.test/cart", vue_html)
            .with_page("https://shop.test/checkout", vue_html),
    );
    let evaluator = MockEvaluator::with_violations(vec![
        Violation::new("axe:image-alt", "Images must have alternate text", Impact::Critical, "WCAG 1.1.1")
            .with_node(ViolationNode::new("<img src=\"a.png\">", "img")),
    ]);
    let (pipeline, _) = offline_pipeline(renderer, Arc::new(evaluator));

    let options = ScanOptions {
        max_pages: 3,
        custom_rules: false,
        ..ScanOptions::default()
    };
    let plan = pipeline
        .run(SEED, &options, &SiteContext::default(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(plan.scan.pages_scanned, 3);
    assert!(!plan.fixes.is_empty());
    assert!(plan.fixes.iter().all(|f| f.framework == FixFramework::Vue));
}

#[tokio::test]
async fn test_seed_failure_reports_categorized_message() {
    let renderer = Arc::new(
        MockRenderer::new().with_failure(SEED, NavigationError::certificate(SEED, "self-signed")),
    );
    let (pipeline, repository) = offline_pipeline(renderer, Arc::new(MockEvaluator::empty()));

    let err = pipeline
        .run(SEED, &ScanOptions::default(), &SiteContext::default(), CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Scan(ScanError::Navigation(_))));
    assert!(err.user_message().contains("certificate"));
    assert!(repository.saved.lock().await.is_empty());
}

#[tokio::test]
async fn test_invalid_input_is_rejected() {
    let (pipeline, _) = offline_pipeline(Arc::new(MockRenderer::new()), Arc::new(MockEvaluator::empty()));

    let bad_url = pipeline
        .run("ftp://shop.test", &ScanOptions::default(), &SiteContext::default(), CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(bad_url, PipelineError::Scan(ScanError::InvalidInput(_))));

    let zero_pages = ScanOptions {
        max_pages: 0,
        ..ScanOptions::default()
    };
    let err = pipeline
        .run(SEED, &zero_pages, &SiteContext::default(), CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Scan(ScanError::InvalidInput(_))));
}

#[tokio::test]
async fn test_usage_gate_rejects_before_scanning() {
    let renderer = Arc::new(MockRenderer::new().with_page(SEED, UNLABELED_INPUT_PAGE));
    let pipeline = AuditPipeline::with_settings(
        collaborators(
            renderer.clone(),
            Arc::new(MockEvaluator::empty()),
            Arc::new(MockRepository::new()),
            Arc::new(RejectAllUsage),
        ),
        &offline_config(),
        fast_settings(),
    );

    let err = pipeline
        .run(SEED, &ScanOptions::default(), &SiteContext::default(), CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Rejected(_)));
    assert_eq!(renderer.close_count(), 0);
}

#[tokio::test]
async fn test_persistence_failure_is_not_fatal() {
    let renderer = Arc::new(MockRenderer::new().with_page(SEED, UNLABELED_INPUT_PAGE));
    let pipeline = AuditPipeline::with_settings(
        collaborators(
            renderer,
            Arc::new(MockEvaluator::empty()),
            Arc::new(MockRepository::failing()),
            Arc::new(AllowAllUsage),
        ),
        &offline_config(),
        fast_settings(),
    );

    let plan = pipeline
        .run(SEED, &ScanOptions::default(), &SiteContext::default(), CancellationToken::new())
        .await;

    assert!(plan.is_ok());
}

#[tokio::test]
async fn test_scan_page_and_detect() {
    let react_page = r#"<html><body><div id="root" data-reactroot=""><main><p>Hi</p></main></div></body></html>"#;
    let renderer = Arc::new(MockRenderer::new().with_page(SEED, react_page));
    let (pipeline, repository) = offline_pipeline(renderer, Arc::new(MockEvaluator::empty()));

    let result = pipeline.scan_page(SEED, &ScanOptions::default()).await.unwrap();
    assert_eq!(result.url, SEED);
    assert_eq!(result.metadata.framework, Framework::React);
    assert!(repository.saved.lock().await.is_empty());

    assert_eq!(pipeline.detect(SEED).await.unwrap(), Framework::React);
    assert_eq!(
        pipeline.detect("https://unknown.test/").await.unwrap(),
        Framework::Vanilla
    );
}
