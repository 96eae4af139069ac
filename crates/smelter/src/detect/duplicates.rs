//! Exact duplicate-row detection.

use crate::cache::ComputationCache;
use crate::error::Result;
use crate::profile::DatasetProfile;
use crate::table::DataTable;

use super::engine::Detector;
use super::finding::{DetectorKind, Finding, IssueType, Severity};

/// Detects exact duplicate rows.
pub struct DuplicateDetector;

impl Detector for DuplicateDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Duplicates
    }

    fn detect(
        &self,
        table: &DataTable,
        profile: &DatasetProfile,
        _cache: &ComputationCache<'_>,
    ) -> Result<Vec<Finding>> {
        let duplicate_count = profile.duplicate_row_count;
        if duplicate_count == 0 {
            return Ok(Vec::new());
        }

        let ratio = if profile.row_count == 0 {
            0.0
        } else {
            duplicate_count as f64 / profile.row_count as f64
        };
        let severity = if ratio > 0.1 {
            Severity::High
        } else if ratio > 0.01 {
            Severity::Medium
        } else {
            Severity::Low
        };

        Ok(vec![Finding::new(
            IssueType::DuplicateRows,
            DetectorKind::Duplicates,
            severity,
            format!(
                "Found {} exact duplicate rows ({:.1}% of data)",
                duplicate_count,
                ratio * 100.0
            ),
        )
        .with_columns(table.columns().to_vec())
        .with_detail("duplicate_count", duplicate_count)
        .with_detail("duplicate_ratio", (ratio * 10_000.0).round() / 10_000.0)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{profile_dataset, ProfileConfig};

    fn detect(table: &DataTable) -> Vec<Finding> {
        let profile = profile_dataset(table, &ProfileConfig::default());
        let cache = ComputationCache::new(table);
        DuplicateDetector.detect(table, &profile, &cache).unwrap()
    }

    #[test]
    fn test_duplicates_found() {
        let t = DataTable::new(
            vec!["a".to_string(), "b".to_string()],
            vec![
                vec!["1".to_string(), "x".to_string()],
                vec!["1".to_string(), "x".to_string()],
                vec!["2".to_string(), "y".to_string()],
            ],
        );
        let findings = detect(&t);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].issue_type, IssueType::DuplicateRows);
        assert_eq!(findings[0].severity, Severity::High);
        assert_eq!(findings[0].detail_f64("duplicate_count"), Some(1.0));
    }

    #[test]
    fn test_no_duplicates_no_finding() {
        let t = DataTable::new(
            vec!["a".to_string()],
            vec![vec!["1".to_string()], vec!["2".to_string()]],
        );
        assert!(detect(&t).is_empty());
    }
}
