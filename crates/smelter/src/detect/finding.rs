//! Finding types for detected data quality issues.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Severity of a finding, also used as suggestion priority.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Numeric rank used by priority scoring (Low = 1, High = 3).
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }
}

/// Closed enumeration of detectable issue types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    MissingValues,
    EmptyStrings,
    DuplicateRows,
    InconsistentCase,
    InconsistentDateFormat,
    WhitespacePadding,
    Outliers,
    NumericAsString,
    BooleanAsString,
    SimilarColumns,
}

impl IssueType {
    /// All issue types, in declaration order.
    pub fn all() -> &'static [IssueType] {
        &[
            IssueType::MissingValues,
            IssueType::EmptyStrings,
            IssueType::DuplicateRows,
            IssueType::InconsistentCase,
            IssueType::InconsistentDateFormat,
            IssueType::WhitespacePadding,
            IssueType::Outliers,
            IssueType::NumericAsString,
            IssueType::BooleanAsString,
            IssueType::SimilarColumns,
        ]
    }

    /// The snake_case tag for this issue type.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::MissingValues => "missing_values",
            IssueType::EmptyStrings => "empty_strings",
            IssueType::DuplicateRows => "duplicate_rows",
            IssueType::InconsistentCase => "inconsistent_case",
            IssueType::InconsistentDateFormat => "inconsistent_date_format",
            IssueType::WhitespacePadding => "whitespace_padding",
            IssueType::Outliers => "outliers",
            IssueType::NumericAsString => "numeric_as_string",
            IssueType::BooleanAsString => "boolean_as_string",
            IssueType::SimilarColumns => "similar_columns",
        }
    }
}

/// The detector family that produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorKind {
    Missing,
    Duplicates,
    Types,
    Formats,
    Outliers,
    Similarity,
}

impl DetectorKind {
    /// All detector kinds, in registry order.
    pub fn all() -> &'static [DetectorKind] {
        &[
            DetectorKind::Missing,
            DetectorKind::Duplicates,
            DetectorKind::Types,
            DetectorKind::Formats,
            DetectorKind::Outliers,
            DetectorKind::Similarity,
        ]
    }

    /// The detector's name.
    pub fn name(&self) -> &'static str {
        match self {
            DetectorKind::Missing => "missing",
            DetectorKind::Duplicates => "duplicates",
            DetectorKind::Types => "types",
            DetectorKind::Formats => "formats",
            DetectorKind::Outliers => "outliers",
            DetectorKind::Similarity => "similarity",
        }
    }
}

/// One detected data quality issue. Findings are value objects: created by
/// detectors, consumed read-only downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Type of issue.
    pub issue_type: IssueType,
    /// Detector family that produced this finding.
    pub category: DetectorKind,
    /// Severity level.
    pub severity: Severity,
    /// Confidence in this finding (0.0-1.0).
    pub confidence: f64,
    /// Columns implicated; a similarity finding names exactly two.
    pub columns: Vec<String>,
    /// Human-readable description.
    pub message: String,
    /// Issue-specific payload.
    pub details: IndexMap<String, Value>,
}

impl Finding {
    /// Create a new finding.
    pub fn new(
        issue_type: IssueType,
        category: DetectorKind,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            issue_type,
            category,
            severity,
            confidence: 1.0,
            columns: Vec::new(),
            message: message.into(),
            details: IndexMap::new(),
        }
    }

    /// Set the implicated column.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.columns = vec![column.into()];
        self
    }

    /// Set the implicated columns.
    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.columns = columns;
        self
    }

    /// Set the confidence.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Attach a detail entry.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Read a numeric detail entry.
    pub fn detail_f64(&self, key: &str) -> Option<f64> {
        self.details.get(key).and_then(Value::as_f64)
    }

    /// Read a string detail entry.
    pub fn detail_str(&self, key: &str) -> Option<&str> {
        self.details.get(key).and_then(Value::as_str)
    }
}
