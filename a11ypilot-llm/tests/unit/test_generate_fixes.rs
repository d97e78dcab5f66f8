//! Unit tests for GenerateFixesUseCase

use std::sync::Arc;

use a11ypilot_core::domain::audit::{
    FixFramework, FrameworkPreference, Impact, Provenance, ScanContext, ViolationNode,
};
use a11ypilot_llm::GenerateFixesUseCase;

#[allow(dead_code)]
mod common {
    include!("../common/mod.rs");
}

use common::{MockLlmProvider, create_test_config, sample_violations, violation};

/// Three fixes without ids; matched to a batch by position
const POSITIONAL_FIXES: &str = r#"[
  {"fixedCode": "<button aria-label=\"Close\">x</button>", "explanation": "Names the control",
   "implementationSteps": ["Add aria-label"], "testingRecommendations": ["Check with a screen reader"],
   "browserCompatibility": "All browsers", "impact": {"before": "Unnamed", "after": "Named"}},
  {"fixedCode": "<main id=\"main\"></main>", "explanation": "Adds a landmark"},
  {"fixedCode": "<ul><li>One</li></ul>", "explanation": "Fixes list structure"}
]"#;

#[tokio::test]
async fn test_no_provider_returns_template_for_every_violation() {
    let use_case = GenerateFixesUseCase::new(None, create_test_config());
    let violations = sample_violations();

    let fixes = use_case.execute(&violations, &ScanContext::default()).await;

    assert_eq!(fixes.len(), violations.len());
    for (fix, violation) in fixes.iter().zip(&violations) {
        assert_eq!(fix.violation_id, violation.id);
        assert_eq!(fix.source, Provenance::Fallback);
        assert_eq!(fix.framework, FixFramework::Html);
        assert!(!fix.fixed_code.trim().is_empty());
        assert!(!fix.original_code.is_empty());
    }
}

#[tokio::test]
async fn test_failed_batch_is_isolated() {
    let provider = Arc::new(
        MockLlmProvider::with_text_response(POSITIONAL_FIXES)
            .failing_when_prompt_contains("axe:color-contrast"),
    );
    let use_case = GenerateFixesUseCase::new(Some(provider.clone()), create_test_config());
    let violations = sample_violations();

    let fixes = use_case.execute(&violations, &ScanContext::default()).await;

    assert_eq!(provider.call_count(), 2);
    assert_eq!(fixes.len(), 6);
    let sources: Vec<Provenance> = fixes.iter().map(|f| f.source).collect();
    assert_eq!(
        sources,
        vec![
            Provenance::Fallback,
            Provenance::Fallback,
            Provenance::Fallback,
            Provenance::Ai,
            Provenance::Ai,
            Provenance::Ai,
        ]
    );

    let ids: Vec<&str> = fixes.iter().map(|f| f.violation_id.as_str()).collect();
    let expected: Vec<&str> = violations.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, expected);

    let ai_fix = &fixes[3];
    assert_eq!(ai_fix.fixed_code, "<button aria-label=\"Close\">x</button>");
    assert_eq!(ai_fix.browser_compatibility, "All browsers");
    assert_eq!(ai_fix.original_code, "<div id=\"axe:aria-allowed-attr\"></div>");
}

#[tokio::test]
async fn test_every_batch_failing_yields_templates() {
    let provider = Arc::new(MockLlmProvider::with_text_response("not json at all"));
    let use_case = GenerateFixesUseCase::new(Some(provider.clone()), create_test_config());
    let violations = sample_violations();

    let fixes = use_case.execute(&violations, &ScanContext::default()).await;

    assert_eq!(provider.call_count(), 2);
    assert_eq!(fixes.len(), violations.len());
    assert!(fixes.iter().all(|f| f.source == Provenance::Fallback));
    assert!(fixes.iter().all(|f| !f.fixed_code.is_empty()));
}

#[tokio::test]
async fn test_empty_fixed_code_rejects_batch() {
    let response = r#"[
        {"fixedCode": "<label for=\"a\">A</label>"},
        {"fixedCode": "   "},
        {"fixedCode": "<ul></ul>"}
    ]"#;
    let provider = Arc::new(MockLlmProvider::with_text_response(response));
    let use_case = GenerateFixesUseCase::new(Some(provider), create_test_config());
    let violations = sample_violations();

    let fixes = use_case.execute(&violations, &ScanContext::default()).await;

    assert!(fixes.iter().all(|f| f.source == Provenance::Fallback));
}

#[tokio::test]
async fn test_requests_use_code_fix_model_and_framework() {
    let provider = Arc::new(MockLlmProvider::with_text_response(POSITIONAL_FIXES));
    let use_case = GenerateFixesUseCase::new(Some(provider.clone()), create_test_config());
    let context = ScanContext {
        framework: FrameworkPreference::Vue,
        url: Some("https://example.com".to_string()),
        ..ScanContext::default()
    };

    let fixes = use_case.execute(&sample_violations(), &context).await;

    assert!(fixes.iter().all(|f| f.framework == FixFramework::Vue));
    let requests = provider.captured_requests.lock().await;
    assert_eq!(requests.len(), 2);
    for request in requests.iter() {
        assert_eq!(request.model.as_deref(), Some("code-fix-model"));
        assert!(request.messages.iter().any(|m| m.content.contains("vue")));
    }
}

#[tokio::test]
async fn test_framework_detected_from_markup() {
    let use_case = GenerateFixesUseCase::new(None, create_test_config());
    let violations = vec![
        violation("axe:button-name", "Buttons must have discernible text", Impact::Critical, "WCAG 4.1.2")
            .with_node(ViolationNode::new("<button _ngcontent-abc-c1></button>", "button")),
    ];

    let fixes = use_case.execute(&violations, &ScanContext::default()).await;

    assert_eq!(fixes[0].framework, FixFramework::Angular);
}

#[tokio::test]
async fn test_empty_input() {
    let provider = Arc::new(MockLlmProvider::with_text_response(POSITIONAL_FIXES));
    let use_case = GenerateFixesUseCase::new(Some(provider.clone()), create_test_config());

    let fixes = use_case.execute(&[], &ScanContext::default()).await;

    assert!(fixes.is_empty());
    assert_eq!(provider.call_count(), 0);
}
