//! Transformation operations, their phases, and their conflict classes.
//!
//! The transformer registry is a closed tagged enum: each variant is one
//! transformer name with its typed parameters, and dispatch is a
//! compile-time table. Extending the registry means adding a variant; every
//! `match` below is exhaustive, so a new variant without a phase or a
//! conflict class will not compile.

use serde::{Deserialize, Serialize};

use crate::config::OutlierMethod;
use crate::error::{Result, SmelterError};

/// Case normalization style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStyle {
    Lower,
    Upper,
    Title,
}

/// Strategy for filling missing values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillStrategy {
    /// Column median (numeric columns).
    Median,
    /// Most frequent value.
    Mode,
    /// A fixed replacement value.
    Value(String),
}

/// Target type for a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTarget {
    Boolean,
    Numeric,
    Datetime,
}

/// Execution phase of a transformation. Applying suggestions in phase order
/// guarantees that no fix undoes another: each phase may assume all earlier
/// phases already ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Duplicate-row removal and row drops.
    Structural = 1,
    /// Whitespace, casing, blank and date-format normalization.
    Normalization = 2,
    /// Missing-value fills.
    MissingHandling = 3,
    /// Boolean/numeric/datetime conversion.
    TypeConversion = 4,
    /// Outlier clipping.
    OutlierHandling = 5,
    /// Column-level drop/rename/merge operations.
    ColumnOps = 6,
}

impl Phase {
    /// The phase number (1-6).
    pub fn number(&self) -> u8 {
        *self as u8
    }
}

/// Conflict class of an operation, for column-state conflict resolution.
/// Operations without a class never conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictClass {
    /// Type-defining conversion (boolean/numeric/datetime).
    TypeConversion,
    /// Upper/lower/title case normalization.
    CaseChange,
    /// Date format standardization.
    DateStandardization,
}

impl ConflictClass {
    /// Whether a column committed to `self` excludes a later operation of
    /// class `later` on the same column. At most one type-defining
    /// conversion proceeds per column, and case changes are meaningless
    /// after a type conversion or date standardization.
    pub fn excludes(&self, later: ConflictClass) -> bool {
        match self {
            ConflictClass::TypeConversion => matches!(
                later,
                ConflictClass::CaseChange | ConflictClass::TypeConversion
            ),
            ConflictClass::DateStandardization => matches!(later, ConflictClass::CaseChange),
            ConflictClass::CaseChange => false,
        }
    }
}

/// A transformation operation: transformer name plus typed parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "transformer", rename_all = "snake_case")]
pub enum TransformOp {
    /// Remove exact duplicate rows.
    DropDuplicateRows { keep_first: bool },
    /// Drop rows with missing values in the given columns.
    DropNullRows { columns: Vec<String> },
    /// Trim leading/trailing whitespace.
    StripWhitespace { columns: Vec<String> },
    /// Normalize casing.
    ConvertCase { columns: Vec<String>, style: CaseStyle },
    /// Convert whitespace-only values to missing.
    BlankToNull { columns: Vec<String> },
    /// Rewrite parseable dates to a single format.
    StandardizeDates { columns: Vec<String>, format: String },
    /// Fill missing values.
    FillMissing {
        columns: Vec<String>,
        strategy: FillStrategy,
    },
    /// Convert values to a target type; non-convertible values become
    /// missing.
    ConvertType {
        columns: Vec<String>,
        target: TypeTarget,
    },
    /// Clip numeric values to outlier fences.
    ClipOutliers {
        columns: Vec<String>,
        method: OutlierMethod,
        threshold: f64,
    },
    /// Drop columns.
    DropColumns { columns: Vec<String> },
    /// Rename a column.
    RenameColumn { from: String, to: String },
    /// Mark similar columns for manual merge review. Applying this is a
    /// no-op; merging data is a human decision.
    MergeReview { columns: Vec<String>, note: String },
}

impl TransformOp {
    /// The transformer name, matching the serialized tag.
    pub fn transformer_name(&self) -> &'static str {
        match self {
            TransformOp::DropDuplicateRows { .. } => "drop_duplicate_rows",
            TransformOp::DropNullRows { .. } => "drop_null_rows",
            TransformOp::StripWhitespace { .. } => "strip_whitespace",
            TransformOp::ConvertCase { .. } => "convert_case",
            TransformOp::BlankToNull { .. } => "blank_to_null",
            TransformOp::StandardizeDates { .. } => "standardize_dates",
            TransformOp::FillMissing { .. } => "fill_missing",
            TransformOp::ConvertType { .. } => "convert_type",
            TransformOp::ClipOutliers { .. } => "clip_outliers",
            TransformOp::DropColumns { .. } => "drop_columns",
            TransformOp::RenameColumn { .. } => "rename_column",
            TransformOp::MergeReview { .. } => "merge_review",
        }
    }

    /// The execution phase of this operation.
    pub fn phase(&self) -> Phase {
        match self {
            TransformOp::DropDuplicateRows { .. } | TransformOp::DropNullRows { .. } => {
                Phase::Structural
            }
            TransformOp::StripWhitespace { .. }
            | TransformOp::ConvertCase { .. }
            | TransformOp::BlankToNull { .. }
            | TransformOp::StandardizeDates { .. } => Phase::Normalization,
            TransformOp::FillMissing { .. } => Phase::MissingHandling,
            TransformOp::ConvertType { .. } => Phase::TypeConversion,
            TransformOp::ClipOutliers { .. } => Phase::OutlierHandling,
            TransformOp::DropColumns { .. }
            | TransformOp::RenameColumn { .. }
            | TransformOp::MergeReview { .. } => Phase::ColumnOps,
        }
    }

    /// The conflict class of this operation, if it participates in
    /// column-state conflicts.
    pub fn conflict_class(&self) -> Option<ConflictClass> {
        match self {
            TransformOp::ConvertType { .. } => Some(ConflictClass::TypeConversion),
            TransformOp::ConvertCase { .. } => Some(ConflictClass::CaseChange),
            TransformOp::StandardizeDates { .. } => Some(ConflictClass::DateStandardization),
            _ => None,
        }
    }

    /// Columns this operation touches, for conflict resolution.
    pub fn columns(&self) -> &[String] {
        match self {
            TransformOp::DropDuplicateRows { .. } => &[],
            TransformOp::DropNullRows { columns }
            | TransformOp::StripWhitespace { columns }
            | TransformOp::ConvertCase { columns, .. }
            | TransformOp::BlankToNull { columns }
            | TransformOp::StandardizeDates { columns, .. }
            | TransformOp::FillMissing { columns, .. }
            | TransformOp::ConvertType { columns, .. }
            | TransformOp::ClipOutliers { columns, .. }
            | TransformOp::DropColumns { columns }
            | TransformOp::MergeReview { columns, .. } => columns,
            TransformOp::RenameColumn { from, .. } => std::slice::from_ref(from),
        }
    }

    /// Parameters as an open map, including the transformer tag.
    pub fn params(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Execution phase for a transformer given by name. An unknown name is a
/// registry misconfiguration and fatal.
pub fn phase_of(transformer: &str) -> Result<Phase> {
    match transformer {
        "drop_duplicate_rows" | "drop_null_rows" => Ok(Phase::Structural),
        "strip_whitespace" | "convert_case" | "blank_to_null" | "standardize_dates" => {
            Ok(Phase::Normalization)
        }
        "fill_missing" => Ok(Phase::MissingHandling),
        "convert_type" => Ok(Phase::TypeConversion),
        "clip_outliers" => Ok(Phase::OutlierHandling),
        "drop_columns" | "rename_column" | "merge_review" => Ok(Phase::ColumnOps),
        other => Err(SmelterError::Scheduling(format!(
            "transformer '{other}' declares no execution phase"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_phases_are_total_and_consistent() {
        let ops = [
            TransformOp::DropDuplicateRows { keep_first: true },
            TransformOp::DropNullRows { columns: cols(&["a"]) },
            TransformOp::StripWhitespace { columns: cols(&["a"]) },
            TransformOp::ConvertCase {
                columns: cols(&["a"]),
                style: CaseStyle::Lower,
            },
            TransformOp::BlankToNull { columns: cols(&["a"]) },
            TransformOp::StandardizeDates {
                columns: cols(&["a"]),
                format: "%Y-%m-%d".to_string(),
            },
            TransformOp::FillMissing {
                columns: cols(&["a"]),
                strategy: FillStrategy::Median,
            },
            TransformOp::ConvertType {
                columns: cols(&["a"]),
                target: TypeTarget::Numeric,
            },
            TransformOp::ClipOutliers {
                columns: cols(&["a"]),
                method: OutlierMethod::Iqr,
                threshold: 1.5,
            },
            TransformOp::DropColumns { columns: cols(&["a"]) },
            TransformOp::RenameColumn {
                from: "a".to_string(),
                to: "b".to_string(),
            },
            TransformOp::MergeReview {
                columns: cols(&["a", "b"]),
                note: String::new(),
            },
        ];

        for op in &ops {
            // The by-name lookup must agree with the typed phase table.
            assert_eq!(phase_of(op.transformer_name()).unwrap(), op.phase());
            assert!((1..=6).contains(&op.phase().number()));
        }
    }

    #[test]
    fn test_unknown_transformer_is_scheduling_error() {
        assert!(matches!(
            phase_of("teleport_rows"),
            Err(SmelterError::Scheduling(_))
        ));
    }

    #[test]
    fn test_exclusion_table() {
        assert!(ConflictClass::TypeConversion.excludes(ConflictClass::CaseChange));
        assert!(ConflictClass::TypeConversion.excludes(ConflictClass::TypeConversion));
        assert!(ConflictClass::DateStandardization.excludes(ConflictClass::CaseChange));
        assert!(!ConflictClass::CaseChange.excludes(ConflictClass::TypeConversion));
        assert!(!ConflictClass::DateStandardization.excludes(ConflictClass::TypeConversion));
    }

    #[test]
    fn test_params_carry_transformer_tag() {
        let op = TransformOp::ConvertType {
            columns: cols(&["flag"]),
            target: TypeTarget::Boolean,
        };
        let params = op.params();
        assert_eq!(params["transformer"], "convert_type");
        assert_eq!(params["target"], "boolean");
    }
}
