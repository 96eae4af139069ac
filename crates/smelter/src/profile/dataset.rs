//! Whole-dataset profile.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::column::ColumnProfile;

/// Record of profiling having run on a sample rather than the full dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleInfo {
    /// Rows in the original dataset.
    pub original_rows: usize,
    /// Rows actually profiled.
    pub sampled_rows: usize,
}

/// Profile of an entire dataset. Owns its column profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetProfile {
    /// Number of data rows.
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// Approximate memory footprint in bytes.
    pub memory_bytes: usize,
    /// Number of exact duplicate rows (beyond the first occurrence).
    pub duplicate_row_count: usize,
    /// Column profiles, keyed by name, in table order.
    pub columns: IndexMap<String, ColumnProfile>,
    /// Set when the data was sampled before profiling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampled: Option<SampleInfo>,
}

impl DatasetProfile {
    /// Look up a column profile by name.
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.get(name)
    }

    /// Column names in table order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }
}
