//! Conflict resolution between suggestions targeting the same column.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::transform::ConflictClass;

use super::suggestion::Suggestion;

/// Removes suggestions that contradict a higher-priority surviving
/// suggestion on the same column.
///
/// This is a single sequential pass in priority order: each surviving
/// suggestion commits its conflict class to every column it touches, and a
/// later suggestion is dropped when any of its columns already committed a
/// class that excludes it. Suggestions are only dropped, never reordered,
/// and resolving an already-resolved list removes nothing.
pub struct ConflictResolver;

impl ConflictResolver {
    /// Resolve conflicts, returning the surviving suggestions in their
    /// input order.
    pub fn resolve(suggestions: Vec<Suggestion>) -> Vec<Suggestion> {
        let mut committed: HashMap<String, HashSet<ConflictClass>> = HashMap::new();
        let mut kept = Vec::with_capacity(suggestions.len());

        for suggestion in suggestions {
            let class = suggestion.op.conflict_class();

            if let Some(class) = class {
                let excluded = suggestion.op.columns().iter().any(|column| {
                    committed
                        .get(column)
                        .is_some_and(|classes| classes.iter().any(|c| c.excludes(class)))
                });
                if excluded {
                    debug!(
                        id = suggestion.id,
                        action = %suggestion.action,
                        "dropping conflicting suggestion"
                    );
                    continue;
                }
                for column in suggestion.op.columns() {
                    committed.entry(column.clone()).or_default().insert(class);
                }
            }

            kept.push(suggestion);
        }

        kept
    }
}
