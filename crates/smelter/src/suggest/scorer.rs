//! Maps findings to suggestions and orders them by effective priority.

use std::cmp::Ordering;

use crate::config::{OutlierMethod, UseCase};
use crate::detect::{Finding, IssueType, Severity};
use crate::transform::{CaseStyle, FillStrategy, TransformOp, TypeTarget};

use super::suggestion::Suggestion;

/// Above this null ratio, dropping rows beats filling them.
const DROP_ROWS_NULL_RATIO: f64 = 0.5;

/// Turns findings into prioritized suggestions.
///
/// The scorer owns the id counter: ids are assigned in emission order,
/// before sorting, and reset with each scorer instance (one per analysis
/// session).
pub struct SuggestionScorer {
    next_id: u32,
}

impl SuggestionScorer {
    /// Create a scorer with a fresh id counter.
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    /// Generate suggestions for the findings, sorted by descending effective
    /// score and truncated to `max_suggestions`. Truncation happens only
    /// after sorting, so the most important suggestions under the use case
    /// always survive.
    pub fn score(
        &mut self,
        findings: &[Finding],
        use_case: UseCase,
        max_suggestions: usize,
    ) -> Vec<Suggestion> {
        let mut suggestions: Vec<Suggestion> = findings
            .iter()
            .filter_map(|finding| self.suggestion_for(finding, use_case))
            .collect();

        suggestions.sort_by(|a, b| {
            let score_a = effective_score(a, use_case);
            let score_b = effective_score(b, use_case);
            score_b
                .partial_cmp(&score_a)
                .unwrap_or(Ordering::Equal)
                .then_with(|| {
                    b.finding
                        .confidence
                        .partial_cmp(&a.finding.confidence)
                        .unwrap_or(Ordering::Equal)
                })
                .then_with(|| a.id.cmp(&b.id))
        });
        suggestions.truncate(max_suggestions);
        suggestions
    }

    /// Build the suggestion for one finding, if its issue type maps to a
    /// fix.
    fn suggestion_for(&mut self, finding: &Finding, use_case: UseCase) -> Option<Suggestion> {
        let columns = finding.columns.clone();
        let (action, op, impact, rationale) = match finding.issue_type {
            IssueType::MissingValues => {
                let null_ratio = finding.detail_f64("null_ratio").unwrap_or(0.0);
                let op = if null_ratio > DROP_ROWS_NULL_RATIO {
                    TransformOp::DropNullRows { columns }
                } else {
                    TransformOp::FillMissing {
                        columns,
                        strategy: FillStrategy::Median,
                    }
                };
                (
                    "Handle missing values",
                    op,
                    "Removes or fills missing values to prevent downstream errors",
                    "Missing values break aggregation and model training",
                )
            }
            IssueType::EmptyStrings => (
                "Convert blank values to missing",
                TransformOp::BlankToNull { columns },
                "Standardizes the representation of missing data",
                "Blank strings are usually unencoded missing values",
            ),
            IssueType::DuplicateRows => (
                "Remove duplicate rows",
                TransformOp::DropDuplicateRows { keep_first: true },
                "Removes redundant rows that skew analysis",
                "Exact duplicates inflate counts and bias statistics",
            ),
            IssueType::InconsistentCase => (
                "Standardize text casing",
                TransformOp::ConvertCase {
                    columns,
                    style: CaseStyle::Lower,
                },
                "Ensures consistent text representation",
                "Mixed casing causes mismatches in grouping and joins",
            ),
            IssueType::InconsistentDateFormat => (
                "Standardize date format",
                TransformOp::StandardizeDates {
                    columns,
                    format: "%Y-%m-%d".to_string(),
                },
                "Ensures consistent date parsing",
                "Mixed date formats cause parsing errors",
            ),
            IssueType::WhitespacePadding => (
                "Strip whitespace from values",
                TransformOp::StripWhitespace { columns },
                "Removes accidental padding that causes mismatches",
                "Leading/trailing whitespace causes silent matching failures",
            ),
            IssueType::Outliers => {
                let method = match finding.detail_str("method") {
                    Some("z_score") => OutlierMethod::ZScore,
                    _ => OutlierMethod::Iqr,
                };
                let threshold = finding.detail_f64("threshold").unwrap_or(1.5);
                (
                    "Clip outlier values",
                    TransformOp::ClipOutliers {
                        columns,
                        method,
                        threshold,
                    },
                    "Reduces the influence of extreme values on analysis",
                    "Outliers can heavily skew means and model training",
                )
            }
            IssueType::NumericAsString => (
                "Convert to numeric type",
                TransformOp::ConvertType {
                    columns,
                    target: TypeTarget::Numeric,
                },
                "Enables numeric operations and reduces memory",
                "Numbers stored as text prevent mathematical operations",
            ),
            IssueType::BooleanAsString => (
                "Convert to boolean type",
                TransformOp::ConvertType {
                    columns,
                    target: TypeTarget::Boolean,
                },
                "Correct typing enables boolean operations",
                "Boolean data stored as text wastes memory and prevents logic",
            ),
            IssueType::SimilarColumns => (
                "Review potentially duplicate columns",
                TransformOp::MergeReview {
                    columns,
                    note: finding.message.clone(),
                },
                "May reduce redundant data",
                "Similar columns may be duplicated data or merge candidates",
            ),
        };

        // Strong use-case boosts also lift the displayed priority label.
        let weight = use_case.weight(finding.issue_type);
        let mut priority = finding.severity;
        if weight >= 1.4 && priority == Severity::Low {
            priority = Severity::Medium;
        } else if weight >= 1.3 && priority == Severity::Medium {
            priority = Severity::High;
        }

        let id = self.next_id;
        self.next_id += 1;

        Some(Suggestion {
            id,
            finding: finding.clone(),
            action: action.to_string(),
            op,
            priority,
            impact: impact.to_string(),
            rationale: rationale.to_string(),
        })
    }
}

impl Default for SuggestionScorer {
    fn default() -> Self {
        Self::new()
    }
}

/// Effective priority score: the finding's severity rank times the use-case
/// weight of its issue type.
pub fn effective_score(suggestion: &Suggestion, use_case: UseCase) -> f64 {
    f64::from(suggestion.finding.severity.rank())
        * use_case.weight(suggestion.finding.issue_type)
}
