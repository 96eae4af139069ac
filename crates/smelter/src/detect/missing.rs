//! Missing-value detection.

use crate::cache::ComputationCache;
use crate::error::Result;
use crate::profile::{ColumnType, DatasetProfile};
use crate::table::DataTable;

use super::engine::Detector;
use super::finding::{DetectorKind, Finding, IssueType, Severity};

/// Detects missing values and blank-string stand-ins for them.
pub struct MissingDetector;

impl Detector for MissingDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Missing
    }

    fn detect(
        &self,
        table: &DataTable,
        profile: &DatasetProfile,
        _cache: &ComputationCache<'_>,
    ) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        for (name, column) in &profile.columns {
            if column.null_count > 0 {
                let severity = if column.null_ratio > 0.5 {
                    Severity::High
                } else if column.null_ratio > 0.1 {
                    Severity::Medium
                } else {
                    Severity::Low
                };

                findings.push(
                    Finding::new(
                        IssueType::MissingValues,
                        DetectorKind::Missing,
                        severity,
                        format!(
                            "Column '{}' has {} missing values ({:.1}%)",
                            name,
                            column.null_count,
                            column.null_ratio * 100.0
                        ),
                    )
                    .with_column(name.clone())
                    .with_detail("null_count", column.null_count)
                    .with_detail("null_ratio", column.null_ratio),
                );
            }

            // Whitespace-only values in string columns usually mean missing
            // data that was never encoded as such.
            if column.dtype == ColumnType::String {
                if let Some(index) = table.column_index(name) {
                    let blank_count = table
                        .column_values(index)
                        .filter(|v| DataTable::is_blank(v))
                        .count();
                    if blank_count > 0 {
                        findings.push(
                            Finding::new(
                                IssueType::EmptyStrings,
                                DetectorKind::Missing,
                                Severity::Medium,
                                format!(
                                    "Column '{name}' has {blank_count} blank values that may represent missing data"
                                ),
                            )
                            .with_column(name.clone())
                            .with_confidence(0.9)
                            .with_detail("blank_count", blank_count),
                        );
                    }
                }
            }
        }

        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{profile_dataset, ProfileConfig};

    fn table(columns: Vec<&str>, rows: Vec<Vec<&str>>) -> DataTable {
        DataTable::new(
            columns.into_iter().map(String::from).collect(),
            rows.into_iter()
                .map(|r| r.into_iter().map(String::from).collect())
                .collect(),
        )
    }

    fn detect(table: &DataTable) -> Vec<Finding> {
        let profile = profile_dataset(table, &ProfileConfig::default());
        let cache = ComputationCache::new(table);
        MissingDetector.detect(table, &profile, &cache).unwrap()
    }

    #[test]
    fn test_missing_values_severity_ladder() {
        let t = table(
            vec!["mostly_null", "some_null", "clean"],
            vec![
                vec!["", "a", "x"],
                vec!["", "", "y"],
                vec!["", "c", "z"],
                vec!["v", "d", "w"],
            ],
        );
        let findings = detect(&t);

        let for_column = |name: &str| {
            findings
                .iter()
                .find(|f| f.issue_type == IssueType::MissingValues && f.columns == vec![name])
        };

        assert_eq!(for_column("mostly_null").unwrap().severity, Severity::High);
        assert_eq!(for_column("some_null").unwrap().severity, Severity::Medium);
        assert!(for_column("clean").is_none());
    }

    #[test]
    fn test_blank_strings_flagged() {
        let t = table(
            vec!["notes"],
            vec![vec!["fine"], vec!["  "], vec!["ok"], vec![" "]],
        );
        let findings = detect(&t);
        let blank = findings
            .iter()
            .find(|f| f.issue_type == IssueType::EmptyStrings)
            .expect("blank finding");

        assert_eq!(blank.detail_f64("blank_count"), Some(2.0));
    }
}
