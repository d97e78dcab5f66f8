//! UI framework fingerprinting

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use url::Url;

use a11ypilot_core::domain::audit::Framework;

use crate::domain::{DomSnapshot, PageRenderer};

const REACT_MARKERS: &[&str] = &[
    "data-reactroot",
    "data-reactid",
    "__next_data__",
    "_reactrootcontainer",
    "__react_devtools_global_hook__",
    "react-dom",
];

const VUE_MARKERS: &[&str] = &[
    "data-v-",
    "__vue__",
    "__vue_app__",
    "__nuxt__",
    "data-server-rendered",
    "vue.global",
    "vue.min.js",
    "vue.runtime",
];

const ANGULAR_MARKERS: &[&str] = &[
    " ng-version",
    "_nghost-",
    "_ngcontent-",
    " ng-app",
    " ng-controller",
    "angular.min.js",
    "angular.js",
];

/// Fingerprint a rendered page; React wins over Vue, Vue over Angular
pub fn detect_in_snapshot(snapshot: &DomSnapshot) -> Framework {
    let html = snapshot.html.to_lowercase();
    let found = |markers: &[&str]| markers.iter().any(|marker| html.contains(marker));

    if found(REACT_MARKERS) {
        Framework::React
    } else if found(VUE_MARKERS) {
        Framework::Vue
    } else if found(ANGULAR_MARKERS) {
        Framework::Angular
    } else {
        Framework::Vanilla
    }
}

/// Loads a page once and fingerprints it; failures fall back to vanilla
pub struct FrameworkDetector {
    renderer: Arc<dyn PageRenderer>,
    navigation_timeout: Duration,
}

impl FrameworkDetector {
    pub fn new(renderer: Arc<dyn PageRenderer>, navigation_timeout: Duration) -> Self {
        Self {
            renderer,
            navigation_timeout,
        }
    }

    pub async fn detect(&self, url: &Url) -> Framework {
        let page = match tokio::time::timeout(self.navigation_timeout, self.renderer.open(url)).await {
            Ok(Ok(page)) => page,
            Ok(Err(e)) => {
                warn!(url = %url, error = %e, "Framework detection could not load page, assuming vanilla");
                return Framework::Vanilla;
            }
            Err(_) => {
                warn!(url = %url, "Framework detection timed out, assuming vanilla");
                return Framework::Vanilla;
            }
        };

        let framework = detect_in_snapshot(page.snapshot());
        page.close().await;

        debug!(url = %url, framework = %framework, "Framework detected");
        framework
    }
}
