pub mod generate_fixes;
pub mod score_violations;

pub use generate_fixes::{GenerateFixesUseCase, resolve_framework, template_fix};
pub use score_violations::{
    ScoreViolationsUseCase, ScoringOutcome, apply_analyses, fallback_analysis, priority_score,
};
