//! a11ypilot LLM - reasoning-service integration
//!
//! Ranks accessibility violations and proposes code fixes with an
//! OpenAI-compatible model, falling back to deterministic rules whenever the
//! service is absent, slow or returns something unusable.
//!
//! ```rust,ignore
//! use a11ypilot_llm::{ProviderRegistry, ScoreViolationsUseCase};
//!
//! let provider = ProviderRegistry::from_llm_config(&config.llm)?;
//! let scoring = ScoreViolationsUseCase::new(provider, config.llm.clone());
//! let outcome = scoring.execute(&violations, &site_context).await;
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::use_cases::{
    GenerateFixesUseCase, ScoreViolationsUseCase, ScoringOutcome, apply_analyses,
    fallback_analysis, priority_score, resolve_framework, template_fix,
};
pub use domain::*;
pub use infrastructure::{OpenAIProvider, ProviderRegistry, ResilientProvider, ResponseParser};
