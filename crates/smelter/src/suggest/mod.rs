//! Suggestion resolution: scoring, conflict resolution and scheduling.
//!
//! The pipeline is: findings → [`SuggestionScorer`] (score, prioritize,
//! truncate) → [`ConflictResolver`] (drop contradictions) →
//! [`ExecutionScheduler`] (order into phases). The resolver and scheduler
//! are strictly sequential passes: their outputs are order-dependent, so no
//! parallelism applies. They only drop and reorder suggestions; they never
//! invent new ones and never mutate a finding.

mod conflict;
mod scheduler;
mod scorer;
mod suggestion;

pub use conflict::ConflictResolver;
pub use scheduler::ExecutionScheduler;
pub use scorer::{effective_score, SuggestionScorer};
pub use suggestion::Suggestion;
