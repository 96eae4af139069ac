//! Statistical outlier detection in numeric columns.

use crate::cache::ComputationCache;
use crate::config::{OutlierMethod, Thresholds};
use crate::error::Result;
use crate::profile::DatasetProfile;
use crate::table::DataTable;

use super::engine::Detector;
use super::finding::{DetectorKind, Finding, IssueType, Severity};

/// Columns with fewer parseable values than this are too small to judge.
const MIN_VALUES: usize = 10;

/// Detects statistical outliers in numeric columns.
pub struct OutlierDetector {
    method: OutlierMethod,
    threshold: f64,
}

impl OutlierDetector {
    /// Create a detector from analysis thresholds.
    pub fn new(thresholds: &Thresholds) -> Self {
        Self {
            method: thresholds.outlier_method,
            threshold: thresholds.outlier_threshold,
        }
    }
}

impl Detector for OutlierDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Outliers
    }

    fn detect(
        &self,
        table: &DataTable,
        profile: &DatasetProfile,
        cache: &ComputationCache<'_>,
    ) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        for (name, column) in &profile.columns {
            if !column.dtype.is_numeric() {
                continue;
            }
            let Some(index) = table.column_index(name) else {
                continue;
            };
            let Some(summary) = cache.numeric_summary(name)? else {
                continue;
            };

            let values: Vec<f64> = table
                .column_values(index)
                .filter_map(|v| v.trim().parse::<f64>().ok())
                .collect();
            if values.len() < MIN_VALUES {
                continue;
            }

            let outlier_count = match self.method {
                OutlierMethod::Iqr => {
                    if summary.iqr() == 0.0 {
                        continue;
                    }
                    let (lower, upper) = summary.iqr_fences(self.threshold);
                    values.iter().filter(|&&v| v < lower || v > upper).count()
                }
                OutlierMethod::ZScore => {
                    if summary.std == 0.0 {
                        continue;
                    }
                    values
                        .iter()
                        .filter(|&&v| summary.z_score(v).abs() > self.threshold)
                        .count()
                }
            };
            if outlier_count == 0 {
                continue;
            }

            let ratio = outlier_count as f64 / values.len() as f64;
            let severity = if ratio > 0.05 {
                Severity::High
            } else if ratio > 0.01 {
                Severity::Medium
            } else {
                Severity::Low
            };

            findings.push(
                Finding::new(
                    IssueType::Outliers,
                    DetectorKind::Outliers,
                    severity,
                    format!(
                        "Column '{}' has {} outliers ({:.1}%) detected by {}",
                        name,
                        outlier_count,
                        ratio * 100.0,
                        self.method.as_str()
                    ),
                )
                .with_column(name.clone())
                .with_confidence(0.85)
                .with_detail("outlier_count", outlier_count)
                .with_detail("outlier_ratio", (ratio * 10_000.0).round() / 10_000.0)
                .with_detail("method", self.method.as_str())
                .with_detail("threshold", self.threshold),
            );
        }

        Ok(findings)
    }
}
