//! Adapters and pure engines behind the scan use cases

pub mod framework_detector;
pub mod heuristics;
pub mod http_renderer;
pub mod links;
pub mod merge;
pub mod remote_evaluator;

pub use framework_detector::{FrameworkDetector, detect_in_snapshot};
pub use heuristics::HeuristicSuite;
pub use http_renderer::HttpPageRenderer;
pub use links::same_origin_links;
pub use merge::{accessibility_score, dedup_and_sort, ensure_unique_ids, merge_all, merge_violations};
pub use remote_evaluator::RemoteRuleEvaluator;
