//! Suggestion type for proposed data fixes.

use serde::{Deserialize, Serialize};

use crate::detect::{Finding, Severity};
use crate::transform::TransformOp;

/// A proposed fix for a finding.
///
/// Ids are assigned in emission order, before any sorting, and stay stable
/// for the lifetime of one analysis session: callers can address a
/// suggestion by id even after the list has been reordered or filtered.
/// Suggestions are never mutated after creation; the conflict resolver and
/// the scheduler only drop and reorder them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    /// Identifier, unique within one analysis session.
    pub id: u32,
    /// The finding this suggestion addresses.
    pub finding: Finding,
    /// Short description of the proposed action.
    pub action: String,
    /// The operation to apply: transformer name plus parameters.
    pub op: TransformOp,
    /// Priority, possibly boosted from the finding's severity by use-case
    /// weighting.
    pub priority: Severity,
    /// What applying this fix changes.
    pub impact: String,
    /// Why this fix matters.
    pub rationale: String,
}

impl Suggestion {
    /// The transformer name for this suggestion's operation.
    pub fn transformer(&self) -> &'static str {
        self.op.transformer_name()
    }
}
