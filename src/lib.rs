//! a11ypilot - accessibility audit pipeline
//!
//! Wires the scan, scoring and fix-suggestion crates together behind
//! [`AuditPipeline`].

mod app;

pub use app::{AuditPipeline, Collaborators, PipelineError, create_pipeline};
pub use a11ypilot_core::{Config, init_tracing};

pub use a11ypilot_core;
pub use a11ypilot_llm;
pub use a11ypilot_scan;
