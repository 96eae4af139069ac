//! Per-column profile and statistics.

use serde::{Deserialize, Serialize};

/// Inferred data type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Float,
    Boolean,
    String,
    #[default]
    Unknown,
}

impl ColumnType {
    /// Whether the type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }
}

/// Summary statistics for a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
    pub median: f64,
    /// First quartile (25th percentile).
    pub q1: f64,
    /// Third quartile (75th percentile).
    pub q3: f64,
}

impl NumericSummary {
    /// The interquartile range.
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// IQR fences at the given multiplier.
    pub fn iqr_fences(&self, multiplier: f64) -> (f64, f64) {
        let iqr = self.iqr();
        (self.q1 - multiplier * iqr, self.q3 + multiplier * iqr)
    }

    /// Z-score of a value under this summary (0.0 when std is 0).
    pub fn z_score(&self, value: f64) -> f64 {
        if self.std == 0.0 {
            0.0
        } else {
            (value - self.mean) / self.std
        }
    }

    /// Summarize a stream of values in one pass.
    ///
    /// Mean and variance use Welford's online algorithm; quantiles come from
    /// a fixed-capacity reservoir with a seeded RNG so repeated runs over the
    /// same data produce identical summaries.
    pub fn from_values(values: impl Iterator<Item = f64>) -> Option<Self> {
        const RESERVOIR_CAPACITY: usize = 1024;

        let mut rng = fastrand::Rng::with_seed(42);
        let mut count = 0usize;
        let mut mean = 0.0f64;
        let mut m2 = 0.0f64;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut reservoir: Vec<f64> = Vec::with_capacity(RESERVOIR_CAPACITY);

        for value in values {
            count += 1;
            let delta = value - mean;
            mean += delta / count as f64;
            m2 += delta * (value - mean);
            min = min.min(value);
            max = max.max(value);

            if reservoir.len() < RESERVOIR_CAPACITY {
                reservoir.push(value);
            } else {
                let j = rng.usize(0..count);
                if j < RESERVOIR_CAPACITY {
                    reservoir[j] = value;
                }
            }
        }

        if count == 0 {
            return None;
        }

        reservoir.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let percentile = |p: f64| -> f64 {
            let idx = ((p / 100.0) * (reservoir.len() - 1) as f64).round() as usize;
            reservoir[idx.min(reservoir.len() - 1)]
        };

        let variance = if count < 2 { 0.0 } else { m2 / count as f64 };

        Some(Self {
            min,
            max,
            mean,
            std: variance.sqrt(),
            median: percentile(50.0),
            q1: percentile(25.0),
            q3: percentile(75.0),
        })
    }
}

/// Pattern tags for a column, as ratios of non-missing values matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternTags {
    /// Fraction of values that look like dates.
    pub date_like: f64,
    /// Fraction of values that look like boolean tokens.
    pub boolean_like: f64,
}

impl PatternTags {
    /// Whether the column is predominantly date-like.
    pub fn is_date_like(&self) -> bool {
        self.date_like >= 0.5
    }

    /// Whether the column is predominantly boolean-like.
    pub fn is_boolean_like(&self) -> bool {
        self.boolean_like >= 0.5
    }
}

/// Profile of a single column. Created once per analysis pass and immutable
/// thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnProfile {
    /// Column name (unique within a dataset).
    pub name: String,
    /// Inferred data type.
    pub dtype: ColumnType,
    /// Number of missing values.
    pub null_count: usize,
    /// Fraction of missing values (0-1).
    pub null_ratio: f64,
    /// Number of distinct non-missing values.
    pub distinct_count: usize,
    /// Distinct count over non-missing count (0-1).
    pub distinct_ratio: f64,
    /// Bounded sample of distinct values, in first-seen order.
    pub sample_values: Vec<String>,
    /// Numeric statistics, for numeric columns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericSummary>,
    /// Detected value patterns.
    pub patterns: PatternTags,
}
