//! HTTP page renderer
//!
//! Fetches the document and its same-origin stylesheets over plain HTTP.
//! Once every stylesheet request has finished the page is treated as network
//! idle. Client-side rendering is not executed, so script-built markup is
//! invisible to this adapter.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::StreamExt;
use scraper::{Html, Selector};
use tracing::{debug, instrument};
use url::Url;

use a11ypilot_core::config::RendererConfig;
use a11ypilot_core::domain::audit::{PerformanceMetrics, Viewport};

use crate::domain::{DomSnapshot, NavigationError, PageRenderer, RenderedPage, SamplingError};

const STYLESHEET_CONCURRENCY: usize = 4;

/// Page renderer backed by `reqwest`
pub struct HttpPageRenderer {
    client: reqwest::Client,
    user_agent: String,
    viewport: Viewport,
    timeout: Duration,
    max_stylesheets: usize,
}

impl HttpPageRenderer {
    pub fn new(config: &RendererConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.navigation_timeout())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self {
            client,
            user_agent: config.user_agent.clone(),
            viewport: Viewport {
                width: config.viewport_width,
                height: config.viewport_height,
            },
            timeout: config.navigation_timeout(),
            max_stylesheets: config.max_stylesheets,
        })
    }

    async fn fetch_stylesheet(&self, url: Url) -> Option<String> {
        match self.client.get(url.clone()).send().await {
            Ok(response) if response.status().is_success() => response.text().await.ok(),
            Ok(response) => {
                debug!(stylesheet = %url, status = %response.status(), "Stylesheet request rejected");
                None
            }
            Err(e) => {
                debug!(stylesheet = %url, error = %e, "Stylesheet request failed");
                None
            }
        }
    }
}

#[async_trait]
impl PageRenderer for HttpPageRenderer {
    #[instrument(skip(self), fields(url = %url))]
    async fn open(&self, url: &Url) -> Result<Box<dyn RenderedPage>, NavigationError> {
        let timeout_secs = self.timeout.as_secs();
        let started = Instant::now();

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| NavigationError::from_reqwest(url.as_str(), e, timeout_secs))?;
        let ttfb = started.elapsed();

        let status = response.status();
        if !status.is_success() {
            return Err(NavigationError::unreachable(
                url.as_str(),
                format!("server responded with HTTP {}", status),
            ));
        }

        let final_url = response.url().clone();
        let html = response
            .text()
            .await
            .map_err(|e| NavigationError::from_reqwest(url.as_str(), e, timeout_secs))?;

        let document = inspect_document(&final_url, &html, self.max_stylesheets);

        let stylesheets: Vec<String> = futures::stream::iter(document.stylesheet_urls)
            .map(|sheet| self.fetch_stylesheet(sheet))
            .buffered(STYLESHEET_CONCURRENCY)
            .filter_map(|sheet| async move { sheet })
            .collect()
            .await;
        let load_time = started.elapsed();

        let load_time_ms = load_time.as_millis() as u64;
        let metrics = PerformanceMetrics {
            time_to_first_byte_ms: ttfb.as_millis() as u64,
            load_time_ms,
            document_bytes: html.len() as u64,
            stylesheet_bytes: stylesheets.iter().map(|s| s.len() as u64).sum(),
            resource_count: 1 + stylesheets.len() as u32,
            dom_node_count: document.element_count,
            performance_score: PerformanceMetrics::score_for_load_time(load_time_ms),
        };

        debug!(
            final_url = %final_url,
            stylesheets = stylesheets.len(),
            load_time_ms,
            "Page loaded"
        );

        Ok(Box::new(HttpRenderedPage {
            snapshot: DomSnapshot {
                url: final_url,
                html,
                stylesheets,
                title: document.title,
                user_agent: self.user_agent.clone(),
                viewport: self.viewport,
            },
            metrics,
        }))
    }
}

/// A fetched document; holds no live connection
struct HttpRenderedPage {
    snapshot: DomSnapshot,
    metrics: PerformanceMetrics,
}

#[async_trait]
impl RenderedPage for HttpRenderedPage {
    fn snapshot(&self) -> &DomSnapshot {
        &self.snapshot
    }

    async fn sample_performance(&self) -> Result<PerformanceMetrics, SamplingError> {
        Ok(self.metrics.clone())
    }

    async fn close(self: Box<Self>) {
        debug!(url = %self.snapshot.url, "Page context released");
    }
}

struct DocumentFacts {
    title: String,
    stylesheet_urls: Vec<Url>,
    element_count: u32,
}

/// Parse once, synchronously; `Html` must not live across an await point
fn inspect_document(base: &Url, html: &str, max_stylesheets: usize) -> DocumentFacts {
    let document = Html::parse_document(html);

    let title = Selector::parse("title")
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let mut stylesheet_urls: Vec<Url> = Vec::new();
    if let Ok(links) = Selector::parse("link[rel~=\"stylesheet\"][href]") {
        for link in document.select(&links) {
            if stylesheet_urls.len() >= max_stylesheets {
                break;
            }
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            if let Ok(resolved) = base.join(href)
                && resolved.origin() == base.origin()
                && !stylesheet_urls.contains(&resolved)
            {
                stylesheet_urls.push(resolved);
            }
        }
    }

    let element_count = document
        .root_element()
        .descendants()
        .filter(|node| node.value().is_element())
        .count() as u32;

    DocumentFacts {
        title,
        stylesheet_urls,
        element_count,
    }
}
