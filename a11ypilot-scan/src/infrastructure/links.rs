//! Same-origin link discovery

use scraper::{Html, Selector};
use url::Url;

use crate::domain::DomSnapshot;

/// Distinct same-origin `<a href>` targets in document order
///
/// Fragments are dropped, so `/about#team` and `/about` count as one page.
/// The page's own URL is never returned.
pub fn same_origin_links(snapshot: &DomSnapshot) -> Vec<Url> {
    let Ok(anchors) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    let document = Html::parse_document(&snapshot.html);
    let base = &snapshot.url;
    let own = without_fragment(base);

    let mut links: Vec<Url> = Vec::new();
    for anchor in document.select(&anchors) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        if href.is_empty() || href.starts_with('#') {
            continue;
        }
        let Ok(resolved) = base.join(href) else {
            continue;
        };
        if !matches!(resolved.scheme(), "http" | "https") || resolved.origin() != base.origin() {
            continue;
        }
        let resolved = without_fragment(&resolved);
        if resolved != own && !links.contains(&resolved) {
            links.push(resolved);
        }
    }
    links
}

fn without_fragment(url: &Url) -> Url {
    let mut url = url.clone();
    url.set_fragment(None);
    url
}
