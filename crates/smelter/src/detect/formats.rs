//! Format inconsistency detection: casing, date styles, whitespace padding.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::cache::ComputationCache;
use crate::error::Result;
use crate::profile::{ColumnProfile, ColumnType, DatasetProfile};
use crate::table::DataTable;

use super::engine::Detector;
use super::finding::{DetectorKind, Finding, IssueType, Severity};

/// Columns with fewer non-missing values than this are too small to judge.
const MIN_VALUES: usize = 5;

static SLASH_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}/\d{1,2}/\d{2,4}$").unwrap());
static DASH_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").unwrap());

/// Detects inconsistent value formats within columns.
pub struct FormatDetector;

impl Detector for FormatDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Formats
    }

    fn detect(
        &self,
        table: &DataTable,
        profile: &DatasetProfile,
        cache: &ComputationCache<'_>,
    ) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        for (name, column) in &profile.columns {
            let Some(index) = table.column_index(name) else {
                continue;
            };
            let present = table
                .column_values(index)
                .filter(|v| !DataTable::is_missing(v))
                .count();
            if present < MIN_VALUES {
                continue;
            }

            if is_textual(column) {
                if let Some(finding) = self.check_case(name, cache) {
                    findings.push(finding);
                }
                if column.patterns.is_date_like() {
                    if let Some(finding) = self.check_date_styles(name, index, table) {
                        findings.push(finding);
                    }
                }
            }

            if let Some(finding) = self.check_whitespace(name, index, table) {
                findings.push(finding);
            }
        }

        Ok(findings)
    }
}

impl FormatDetector {
    /// Mixed upper/lower/title casing across a column's distinct values.
    fn check_case(&self, name: &str, cache: &ComputationCache<'_>) -> Option<Finding> {
        let value_set = cache.value_set(name).ok()?;

        let mut has_upper = false;
        let mut has_lower = false;
        let mut has_title = false;
        for value in &value_set.values {
            let trimmed = value.trim();
            has_upper |= is_uppercase(trimmed);
            has_lower |= is_lowercase(trimmed);
            has_title |= is_titlecase(trimmed);
        }

        let styles = usize::from(has_upper) + usize::from(has_lower) + usize::from(has_title);
        if styles < 2 {
            return None;
        }

        Some(
            Finding::new(
                IssueType::InconsistentCase,
                DetectorKind::Formats,
                Severity::Low,
                format!("Column '{name}' has inconsistent casing (mixed upper/lower/title case)"),
            )
            .with_column(name.to_string())
            .with_confidence(0.8)
            .with_detail("has_upper", has_upper)
            .with_detail("has_lower", has_lower)
            .with_detail("has_title", has_title),
        )
    }

    /// Slash-style and ISO-style dates coexisting in one column.
    fn check_date_styles(&self, name: &str, index: usize, table: &DataTable) -> Option<Finding> {
        let mut slash = 0usize;
        let mut dash = 0usize;
        for value in table.column_values(index) {
            let trimmed = value.trim();
            if SLASH_DATE.is_match(trimmed) {
                slash += 1;
            } else if DASH_DATE.is_match(trimmed) {
                dash += 1;
            }
        }
        if slash == 0 || dash == 0 {
            return None;
        }

        Some(
            Finding::new(
                IssueType::InconsistentDateFormat,
                DetectorKind::Formats,
                Severity::Medium,
                format!(
                    "Column '{name}' has mixed date formats ({slash} slash-style, {dash} ISO-style)"
                ),
            )
            .with_column(name.to_string())
            .with_confidence(0.85)
            .with_detail("slash_count", slash)
            .with_detail("dash_count", dash),
        )
    }

    /// Values carrying leading or trailing whitespace.
    fn check_whitespace(&self, name: &str, index: usize, table: &DataTable) -> Option<Finding> {
        let mut leading = 0usize;
        let mut trailing = 0usize;
        for value in table.column_values(index) {
            if DataTable::is_missing(value) {
                continue;
            }
            if value.trim_start() != value {
                leading += 1;
            }
            if value.trim_end() != value {
                trailing += 1;
            }
        }
        let total = leading + trailing;
        if total == 0 {
            return None;
        }

        Some(
            Finding::new(
                IssueType::WhitespacePadding,
                DetectorKind::Formats,
                Severity::Low,
                format!("Column '{name}' has {total} values with leading/trailing whitespace"),
            )
            .with_column(name.to_string())
            .with_detail("leading_count", leading)
            .with_detail("trailing_count", trailing),
        )
    }
}

fn is_textual(column: &ColumnProfile) -> bool {
    matches!(column.dtype, ColumnType::String | ColumnType::Boolean)
}

fn is_uppercase(value: &str) -> bool {
    value.chars().any(char::is_alphabetic) && !value.chars().any(char::is_lowercase)
}

fn is_lowercase(value: &str) -> bool {
    value.chars().any(char::is_alphabetic) && !value.chars().any(char::is_uppercase)
}

/// Titlecase: every word starts with an uppercase letter followed only by
/// lowercase letters.
fn is_titlecase(value: &str) -> bool {
    let mut any_word = false;
    for word in value.split_whitespace() {
        let mut chars = word.chars().filter(|c| c.is_alphabetic());
        match chars.next() {
            Some(first) if first.is_uppercase() => {
                if chars.any(|c| c.is_uppercase()) {
                    return false;
                }
                any_word = true;
            }
            Some(_) => return false,
            None => {}
        }
    }
    any_word
}
