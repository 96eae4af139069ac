//! Profiling pass: builds a [`DatasetProfile`] from a table.

use std::collections::HashSet;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::table::DataTable;

use super::column::{ColumnProfile, ColumnType, NumericSummary, PatternTags};
use super::dataset::{DatasetProfile, SampleInfo};

static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\d{4}-\d{2}-\d{2}").unwrap(),
        Regex::new(r"^\d{1,2}/\d{1,2}/\d{2,4}$").unwrap(),
        Regex::new(r"^\d{2}-\d{2}-\d{4}$").unwrap(),
        Regex::new(r"^\d{4}/\d{2}/\d{2}").unwrap(),
    ]
});

/// Whether a trimmed value matches any known date shape.
pub(crate) fn looks_like_date(value: &str) -> bool {
    DATE_PATTERNS.iter().any(|p| p.is_match(value))
}

/// Interpret a value as a boolean token, case-insensitively.
pub(crate) fn boolean_token_value(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "y" | "t" | "1" | "on" => Some(true),
        "false" | "no" | "n" | "f" | "0" | "off" => Some(false),
        _ => None,
    }
}

/// Profiling options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Datasets above this many rows are profiled on a sample.
    pub sample_threshold: usize,
    /// Rows profiled when sampling kicks in.
    pub sample_size: usize,
    /// Maximum distinct values retained as a column's sample.
    pub max_sample_values: usize,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            sample_threshold: 50_000,
            sample_size: 10_000,
            max_sample_values: 10,
        }
    }
}

/// Profile a dataset: per-column types, null/distinct counts, numeric
/// summaries and pattern tags, plus dataset-level duplicate-row counts.
///
/// Datasets above the sample threshold are profiled on a deterministic head
/// sample; `sampled` records when this happened.
pub fn profile_dataset(table: &DataTable, config: &ProfileConfig) -> DatasetProfile {
    let total_rows = table.row_count();
    let limit = if total_rows > config.sample_threshold {
        config.sample_size
    } else {
        total_rows
    };
    let sampled = (limit < total_rows).then_some(SampleInfo {
        original_rows: total_rows,
        sampled_rows: limit,
    });

    let mut columns = IndexMap::with_capacity(table.column_count());
    for (index, name) in table.columns().iter().enumerate() {
        let values: Vec<&str> = table.column_values(index).take(limit).collect();
        columns.insert(name.clone(), profile_column(name, &values, config));
    }

    let mut seen = HashSet::with_capacity(limit);
    let duplicate_row_count = table
        .rows()
        .take(limit)
        .filter(|row| !seen.insert(*row))
        .count();

    DatasetProfile {
        row_count: total_rows,
        column_count: table.column_count(),
        memory_bytes: table.memory_bytes(),
        duplicate_row_count,
        columns,
        sampled,
    }
}

fn profile_column(name: &str, values: &[&str], config: &ProfileConfig) -> ColumnProfile {
    let total = values.len();
    let mut null_count = 0usize;
    let mut int_votes = 0usize;
    let mut float_votes = 0usize;
    let mut bool_votes = 0usize;
    let mut date_votes = 0usize;
    let mut distinct: HashSet<&str> = HashSet::new();
    let mut sample_values: Vec<String> = Vec::new();

    for &value in values {
        if DataTable::is_missing(value) {
            null_count += 1;
            continue;
        }
        let trimmed = value.trim();
        if trimmed.parse::<i64>().is_ok() {
            int_votes += 1;
        }
        if trimmed.parse::<f64>().is_ok() {
            float_votes += 1;
        }
        if boolean_token_value(trimmed).is_some() {
            bool_votes += 1;
        }
        if looks_like_date(trimmed) {
            date_votes += 1;
        }
        if distinct.insert(value) && sample_values.len() < config.max_sample_values {
            sample_values.push(value.to_string());
        }
    }

    let present = total - null_count;
    let dtype = if present == 0 {
        ColumnType::Unknown
    } else if int_votes == present {
        ColumnType::Integer
    } else if float_votes == present {
        ColumnType::Float
    } else if bool_votes == present {
        ColumnType::Boolean
    } else {
        ColumnType::String
    };

    let numeric = if dtype.is_numeric() {
        NumericSummary::from_values(
            values
                .iter()
                .filter(|v| !DataTable::is_missing(v))
                .filter_map(|v| v.trim().parse::<f64>().ok()),
        )
    } else {
        None
    };

    let patterns = if present == 0 {
        PatternTags::default()
    } else {
        PatternTags {
            date_like: date_votes as f64 / present as f64,
            boolean_like: bool_votes as f64 / present as f64,
        }
    };

    ColumnProfile {
        name: name.to_string(),
        dtype,
        null_count,
        null_ratio: if total == 0 {
            0.0
        } else {
            null_count as f64 / total as f64
        },
        distinct_count: distinct.len(),
        distinct_ratio: if present == 0 {
            0.0
        } else {
            distinct.len() as f64 / present as f64
        },
        sample_values,
        numeric,
        patterns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: Vec<&str>, rows: Vec<Vec<&str>>) -> DataTable {
        DataTable::new(
            columns.into_iter().map(String::from).collect(),
            rows.into_iter()
                .map(|r| r.into_iter().map(String::from).collect())
                .collect(),
        )
    }

    #[test]
    fn test_profile_types() {
        let t = table(
            vec!["id", "score", "active", "name"],
            vec![
                vec!["1", "1.5", "yes", "Alice"],
                vec!["2", "2.5", "no", "Bob"],
                vec!["3", "0.5", "yes", "Carol"],
            ],
        );
        let profile = profile_dataset(&t, &ProfileConfig::default());

        assert_eq!(profile.column("id").unwrap().dtype, ColumnType::Integer);
        assert_eq!(profile.column("score").unwrap().dtype, ColumnType::Float);
        assert_eq!(profile.column("active").unwrap().dtype, ColumnType::Boolean);
        assert_eq!(profile.column("name").unwrap().dtype, ColumnType::String);
    }

    #[test]
    fn test_profile_nulls_and_distinct() {
        let t = table(
            vec!["status"],
            vec![vec!["active"], vec![""], vec!["active"], vec!["inactive"]],
        );
        let profile = profile_dataset(&t, &ProfileConfig::default());
        let col = profile.column("status").unwrap();

        assert_eq!(col.null_count, 1);
        assert!((col.null_ratio - 0.25).abs() < 1e-9);
        assert_eq!(col.distinct_count, 2);
        assert_eq!(col.sample_values, vec!["active", "inactive"]);
    }

    #[test]
    fn test_profile_numeric_summary() {
        let t = table(
            vec!["n"],
            vec![vec!["1"], vec!["2"], vec!["3"], vec!["4"], vec!["5"]],
        );
        let profile = profile_dataset(&t, &ProfileConfig::default());
        let summary = profile.column("n").unwrap().numeric.as_ref().unwrap();

        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 5.0);
    }

    #[test]
    fn test_duplicate_rows_counted() {
        let t = table(
            vec!["a", "b"],
            vec![
                vec!["1", "x"],
                vec!["1", "x"],
                vec!["2", "y"],
                vec!["1", "x"],
            ],
        );
        let profile = profile_dataset(&t, &ProfileConfig::default());
        assert_eq!(profile.duplicate_row_count, 2);
    }

    #[test]
    fn test_sampling_recorded() {
        let rows: Vec<Vec<&str>> = (0..30).map(|_| vec!["v"]).collect();
        let t = table(vec!["c"], rows);
        let config = ProfileConfig {
            sample_threshold: 10,
            sample_size: 5,
            ..ProfileConfig::default()
        };
        let profile = profile_dataset(&t, &config);

        assert_eq!(profile.row_count, 30);
        assert_eq!(
            profile.sampled,
            Some(SampleInfo {
                original_rows: 30,
                sampled_rows: 5
            })
        );
    }

    #[test]
    fn test_date_pattern_tagging() {
        let t = table(
            vec!["when"],
            vec![vec!["2024-01-05"], vec!["2024-02-10"], vec!["03/04/2024"]],
        );
        let profile = profile_dataset(&t, &ProfileConfig::default());
        assert!(profile.column("when").unwrap().patterns.is_date_like());
    }
}
