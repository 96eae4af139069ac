//! Mistyped-column detection: numeric or boolean data stored as text.
//!
//! Every cell in a [`DataTable`] is text, so a column whose values parse
//! cleanly as numbers or boolean tokens is a conversion candidate. String
//! columns are also flagged when *most* (not all) values parse as numbers,
//! since the stragglers are usually junk that coercion should turn into
//! missing values.

use crate::cache::ComputationCache;
use crate::error::Result;
use crate::profile::{ColumnType, DatasetProfile};
use crate::table::DataTable;

use super::engine::Detector;
use super::finding::{DetectorKind, Finding, IssueType, Severity};

/// Fraction of parseable values above which a string column is flagged as
/// numeric-as-string.
const NUMERIC_RATIO_THRESHOLD: f64 = 0.8;

/// Detects columns whose storage hides a more specific type.
pub struct TypeDetector;

impl TypeDetector {
    fn numeric_finding(name: &str, ratio: f64) -> Finding {
        Finding::new(
            IssueType::NumericAsString,
            DetectorKind::Types,
            Severity::Medium,
            format!(
                "Column '{}' appears numeric but is stored as text ({:.0}% parseable)",
                name,
                ratio * 100.0
            ),
        )
        .with_column(name.to_string())
        .with_confidence(ratio)
        .with_detail("numeric_ratio", (ratio * 1000.0).round() / 1000.0)
    }
}

impl Detector for TypeDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Types
    }

    fn detect(
        &self,
        table: &DataTable,
        profile: &DatasetProfile,
        cache: &ComputationCache<'_>,
    ) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        for (name, column) in &profile.columns {
            match column.dtype {
                ColumnType::Integer | ColumnType::Float => {
                    findings.push(Self::numeric_finding(name, 1.0));
                }
                ColumnType::String => {
                    let Some(index) = table.column_index(name) else {
                        continue;
                    };
                    let mut present = 0usize;
                    let mut numeric = 0usize;
                    for value in table.column_values(index) {
                        if DataTable::is_missing(value) {
                            continue;
                        }
                        present += 1;
                        if value.trim().parse::<f64>().is_ok() {
                            numeric += 1;
                        }
                    }
                    if present > 0 {
                        let ratio = numeric as f64 / present as f64;
                        if ratio > NUMERIC_RATIO_THRESHOLD {
                            findings.push(Self::numeric_finding(name, ratio));
                        }
                    }
                }
                ColumnType::Boolean => {
                    let values: Vec<String> = match cache.value_set(name) {
                        Ok(set) => set
                            .values
                            .iter()
                            .map(|v| v.trim().to_lowercase())
                            .collect::<std::collections::BTreeSet<_>>()
                            .into_iter()
                            .collect(),
                        Err(_) => Vec::new(),
                    };
                    findings.push(
                        Finding::new(
                            IssueType::BooleanAsString,
                            DetectorKind::Types,
                            Severity::Low,
                            format!("Column '{name}' contains boolean-like values stored as text"),
                        )
                        .with_column(name.clone())
                        .with_confidence(0.95)
                        .with_detail("values", values),
                    );
                }
                ColumnType::Unknown => {}
            }
        }

        Ok(findings)
    }
}
