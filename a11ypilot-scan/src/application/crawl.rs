//! Multi-page crawl coordination

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use url::Url;

use a11ypilot_core::config::CrawlConfig;
use a11ypilot_core::domain::audit::{ScanOptions, ScanResult};

use super::scan_page::ScanPageUseCase;
use crate::domain::ScanError;
use crate::infrastructure::same_origin_links;

/// Parse and check a user-supplied target URL
pub fn parse_target_url(input: &str) -> Result<Url, ScanError> {
    let url = Url::parse(input.trim())
        .map_err(|e| ScanError::invalid_input(format!("malformed URL '{}': {}", input, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ScanError::invalid_input(format!(
            "unsupported URL scheme '{}', expected http or https",
            url.scheme()
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ScanError::invalid_input(format!("URL '{}' has no host", input)));
    }
    Ok(url)
}

/// Discovers same-origin pages from a seed and scans them with bounded concurrency
pub struct CrawlUseCase {
    scanner: Arc<ScanPageUseCase>,
    max_concurrent_pages: usize,
}

impl CrawlUseCase {
    pub fn new(scanner: Arc<ScanPageUseCase>, config: &CrawlConfig) -> Self {
        Self {
            scanner,
            max_concurrent_pages: config.max_concurrent_pages.max(1),
        }
    }

    /// Scan the seed and up to `max_pages - 1` discovered pages.
    ///
    /// The seed's result is always first; the rest follow discovery order.
    /// Pages that fail are logged and left out. Only a failed (or cancelled)
    /// seed is reported as an error.
    #[instrument(skip(self, options, cancel), fields(seed = %seed, max_pages = options.max_pages))]
    pub async fn execute(
        &self,
        seed: &Url,
        options: &ScanOptions,
        cancel: CancellationToken,
    ) -> Result<Vec<ScanResult>, ScanError> {
        options
            .validate()
            .map_err(|e| ScanError::invalid_input(e.to_string()))?;
        parse_target_url(seed.as_str())?;

        let targets = self.discover(seed, options).await?;
        info!(pages = targets.len(), "Crawl targets selected");

        let total = targets.len();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_pages));
        let mut join_set: JoinSet<(usize, Result<ScanResult, ScanError>)> = JoinSet::new();

        for (index, url) in targets.into_iter().enumerate() {
            let scanner = Arc::clone(&self.scanner);
            let permits = Arc::clone(&semaphore);
            let options = options.clone();
            let cancel = cancel.clone();

            join_set.spawn(async move {
                let _permit = tokio::select! {
                    _ = cancel.cancelled() => return (index, Err(ScanError::Cancelled)),
                    permit = permits.acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => return (index, Err(ScanError::Cancelled)),
                    },
                };

                (index, scanner.execute_until(&url, &options, &cancel).await)
            });
        }

        let mut slots: Vec<Option<ScanResult>> = (0..total).map(|_| None).collect();
        let mut seed_error: Option<ScanError> = None;

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, Ok(result))) => slots[index] = Some(result),
                Ok((0, Err(e))) => seed_error = Some(e),
                Ok((index, Err(ScanError::Cancelled))) => {
                    debug!(index, "Page scan cancelled");
                }
                Ok((index, Err(e))) => {
                    warn!(index, error = %e, "Page scan failed, excluding from crawl");
                }
                Err(e) => {
                    warn!(error = %e, "Page scan task aborted");
                }
            }
        }

        if slots.first().is_none_or(Option::is_none) {
            return Err(seed_error.unwrap_or(ScanError::Cancelled));
        }

        let results: Vec<ScanResult> = slots.into_iter().flatten().collect();
        info!(scanned = results.len(), requested = total, "Crawl completed");
        Ok(results)
    }

    /// Seed first, then distinct same-origin links breadth-first up to `crawl_depth`
    async fn discover(&self, seed: &Url, options: &ScanOptions) -> Result<Vec<Url>, ScanError> {
        let mut targets = vec![seed.clone()];
        if options.max_pages <= 1 || options.crawl_depth == 0 {
            return Ok(targets);
        }

        let page = self.scanner.open_page(seed).await?;
        let mut frontier = same_origin_links(page.snapshot());
        page.close().await;

        let mut depth = 1;
        loop {
            let mut added = Vec::new();
            for link in frontier {
                if targets.len() >= options.max_pages {
                    return Ok(targets);
                }
                if !targets.contains(&link) {
                    targets.push(link.clone());
                    added.push(link);
                }
            }

            if depth >= options.crawl_depth || added.is_empty() {
                return Ok(targets);
            }

            frontier = stream::iter(added)
                .map(|url| self.links_of(url))
                .buffered(self.max_concurrent_pages)
                .flat_map(stream::iter)
                .collect()
                .await;
            depth += 1;
        }
    }

    /// Same-origin links of one discovered page; unreachable pages yield none
    async fn links_of(&self, url: Url) -> Vec<Url> {
        match self.scanner.open_page(&url).await {
            Ok(page) => {
                let links = same_origin_links(page.snapshot());
                page.close().await;
                links
            }
            Err(e) => {
                debug!(url = %url, error = %e, "Link discovery skipped page");
                Vec::new()
            }
        }
    }
}
