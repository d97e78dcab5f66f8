//! Integration tests for the HTTP renderer and the remote rule evaluator

use std::time::Duration;

use a11ypilot_core::config::{EvaluatorConfig, RendererConfig};
use a11ypilot_core::domain::audit::Impact;
use a11ypilot_scan::{
    DomSnapshot, HttpPageRenderer, NavigationErrorKind, PageRenderer, RemoteRuleEvaluator,
    RuleEvaluationError, RuleEvaluator,
};
use rstest::rstest;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn renderer_config() -> RendererConfig {
    RendererConfig {
        navigation_timeout_seconds: 1,
        ..RendererConfig::default()
    }
}

#[tokio::test]
async fn test_renderer_collects_document_and_stylesheets() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><head><title>Home</title><link rel="stylesheet" href="/site.css"></head>
               <body><a href="/about">About</a></body></html>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/site.css"))
        .respond_with(ResponseTemplate::new(200).set_body_string("a:focus { outline: 2px solid }"))
        .mount(&server)
        .await;

    let renderer = HttpPageRenderer::new(&renderer_config()).unwrap();
    let url = Url::parse(&format!("{}/", server.uri())).unwrap();

    let page = renderer.open(&url).await.unwrap();
    let snapshot = page.snapshot().clone();
    let metrics = page.sample_performance().await.unwrap();
    page.close().await;

    assert_eq!(snapshot.title, "Home");
    assert_eq!(snapshot.stylesheets, vec!["a:focus { outline: 2px solid }".to_string()]);
    assert_eq!(snapshot.viewport.width, 1920);
    assert_eq!(metrics.resource_count, 2);
    assert!(metrics.document_bytes > 0);
    assert!(metrics.performance_score > 0.0);
}

#[tokio::test]
async fn test_renderer_maps_http_error_to_unreachable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let renderer = HttpPageRenderer::new(&renderer_config()).unwrap();
    let err = renderer
        .open(&Url::parse(&server.uri()).unwrap())
        .await
        .err()
        .unwrap();

    assert_eq!(err.kind(), NavigationErrorKind::Unreachable);
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_renderer_maps_slow_response_to_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html></html>")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let renderer = HttpPageRenderer::new(&renderer_config()).unwrap();
    let err = renderer
        .open(&Url::parse(&server.uri()).unwrap())
        .await
        .err()
        .unwrap();

    assert_eq!(err.kind(), NavigationErrorKind::Timeout);
}

/// Port on 127.0.0.1 with nothing listening
async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

#[rstest]
#[case("/")]
#[case("/ssl-checkout")]
#[case("/tls/handshake")]
#[case("/certificate-renewal")]
#[tokio::test]
async fn test_renderer_maps_refused_connection_to_unreachable(#[case] path: &str) {
    let port = closed_port().await;
    let renderer = HttpPageRenderer::new(&renderer_config()).unwrap();
    let err = renderer
        .open(&Url::parse(&format!("http://127.0.0.1:{}{}", port, path)).unwrap())
        .await
        .err()
        .unwrap();

    assert_eq!(err.kind(), NavigationErrorKind::Unreachable, "{}", err);
    assert_eq!(err.url(), format!("http://127.0.0.1:{}{}", port, path));
}

#[tokio::test]
async fn test_renderer_maps_failed_tls_handshake_to_certificate_error() {
    // Answers every TLS client hello with plaintext HTTP.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\n\r\n")
                    .await;
                let _ = socket.flush().await;
                tokio::time::sleep(Duration::from_millis(200)).await;
            });
        }
    });

    let renderer = HttpPageRenderer::new(&renderer_config()).unwrap();
    let err = renderer
        .open(&Url::parse(&format!("https://127.0.0.1:{}/", port)).unwrap())
        .await
        .err()
        .unwrap();

    assert_eq!(err.kind(), NavigationErrorKind::CertificateError, "{}", err);
    assert!(!err.to_string().contains("Connection refused"));
}

fn evaluator_for(server: &MockServer) -> RemoteRuleEvaluator {
    RemoteRuleEvaluator::new(&EvaluatorConfig {
        endpoint: format!("{}/evaluate", server.uri()),
        timeout_seconds: 5,
        ..EvaluatorConfig::default()
    })
    .unwrap()
}

fn snapshot() -> DomSnapshot {
    DomSnapshot::from_html(
        Url::parse("https://shop.test/").unwrap(),
        "<html><body><img src=\"a.png\"></body></html>",
    )
}

#[tokio::test]
async fn test_evaluator_posts_page_and_maps_results() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/evaluate"))
        .and(body_partial_json(json!({ "url": "https://shop.test/", "tags": ["wcag2a"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "violations": [{
                "id": "image-alt",
                "impact": "critical",
                "description": "Ensures <img> elements have alternate text",
                "help": "Images must have alternate text",
                "helpUrl": "https://dequeuniversity.com/rules/axe/4.8/image-alt",
                "tags": ["cat.text-alternatives", "wcag2a", "wcag111"],
                "nodes": [{ "html": "<img src=\"a.png\">", "target": ["img"], "failureSummary": "Fix any of the following" }]
            }],
            "passes": [{ "id": "document-title", "impact": null, "description": "Documents have a title", "tags": ["wcag2a", "wcag242"], "nodes": [] }],
            "incomplete": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let evaluation = evaluator_for(&server)
        .evaluate(&snapshot(), &["wcag2a".to_string()])
        .await
        .unwrap();

    assert_eq!(evaluation.violations.len(), 1);
    let violation = &evaluation.violations[0];
    assert_eq!(violation.id, "axe:image-alt");
    assert_eq!(violation.impact, Impact::Critical);
    assert_eq!(violation.wcag_reference, "WCAG 1.1.1");
    assert_eq!(violation.element_count, 1);
    assert_eq!(evaluation.passes[0].wcag_reference, "WCAG 2.4.2");
    assert!(evaluation.incomplete.is_empty());
}

#[tokio::test]
async fn test_evaluator_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("axe crashed"))
        .mount(&server)
        .await;

    let err = evaluator_for(&server)
        .evaluate(&snapshot(), &[])
        .await
        .unwrap_err();

    assert_eq!(
        err,
        RuleEvaluationError::Status {
            status: 500,
            message: "axe crashed".to_string()
        }
    );
}

#[tokio::test]
async fn test_evaluator_rejects_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = evaluator_for(&server)
        .evaluate(&snapshot(), &[])
        .await
        .unwrap_err();

    assert!(matches!(err, RuleEvaluationError::InvalidResponse(_)));
}
