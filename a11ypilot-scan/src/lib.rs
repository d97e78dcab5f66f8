//! a11ypilot Scan - page scanning and crawl coordination
//!
//! This crate turns URLs into accessibility findings:
//!
//! - [`domain`]: Navigation / rule-evaluation error taxonomy and the
//!   `PageRenderer` and `RuleEvaluator` ports
//! - [`infrastructure`]: HTTP renderer, remote axe-compatible evaluator,
//!   heuristic check suite, framework detector, merge/dedup engine
//! - [`application`]: Single-page scan, crawl coordination and aggregation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use a11ypilot_scan::{CrawlUseCase, HeuristicSuite, ScanPageUseCase, ScanSettings};
//!
//! let scanner = Arc::new(ScanPageUseCase::new(
//!     renderer,
//!     evaluator,
//!     HeuristicSuite::standard(),
//!     ScanSettings::from_config(&config.renderer, &config.evaluator),
//! ));
//! let crawl = CrawlUseCase::new(scanner, &config.crawl);
//! let pages = crawl.execute(&seed, &options, CancellationToken::new()).await?;
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{CrawlUseCase, ScanPageUseCase, ScanSettings, aggregate, parse_target_url};
pub use domain::{
    DomSnapshot, HeuristicCheckError, NavigationError, NavigationErrorKind, PageRenderer,
    RenderedPage, RuleEvaluation, RuleEvaluationError, RuleEvaluator, SamplingError, ScanError,
};
pub use infrastructure::{
    FrameworkDetector, HeuristicSuite, HttpPageRenderer, RemoteRuleEvaluator, merge_violations,
};
