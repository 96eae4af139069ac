//! Execution scheduling: orders suggestions into fixed phases.

use super::suggestion::Suggestion;

/// Orders conflict-resolved suggestions into execution phases.
///
/// The sort is stable, so within a phase the priority order from scoring is
/// preserved. The output is a total, deterministic function of the input:
/// the same suggestion list always schedules identically, and phase numbers
/// in the output are non-decreasing. Later phases assume earlier ones
/// already ran (outlier clipping expects numeric conversion, column merges
/// expect normalized values), which is why phases are fixed rather than
/// inferred.
pub struct ExecutionScheduler;

impl ExecutionScheduler {
    /// Schedule suggestions into phase order.
    pub fn schedule(mut suggestions: Vec<Suggestion>) -> Vec<Suggestion> {
        suggestions.sort_by_key(|s| s.op.phase().number());
        debug_assert!(
            suggestions
                .windows(2)
                .all(|w| w[0].op.phase().number() <= w[1].op.phase().number()),
            "scheduled phases must be non-decreasing"
        );
        suggestions
    }
}
