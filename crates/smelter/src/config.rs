//! Analysis configuration.
//!
//! Configuration is validated up front: an invalid use case or threshold is
//! reported synchronously, before any detector runs.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::detect::{DetectorKind, IssueType};
use crate::error::{Result, SmelterError};
use crate::profile::ProfileConfig;

/// Named weighting profile biasing suggestion priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UseCase {
    /// No boosts; findings keep their base severity.
    #[default]
    General,
    /// Machine-learning preparation: deduplication and type hygiene first.
    Ml,
    /// Analytics/BI: completeness and date consistency first.
    Analytics,
    /// Export/interchange: formatting consistency first.
    Export,
}

impl UseCase {
    /// The canonical tag for this use case.
    pub fn as_str(&self) -> &'static str {
        match self {
            UseCase::General => "general",
            UseCase::Ml => "ml",
            UseCase::Analytics => "analytics",
            UseCase::Export => "export",
        }
    }

    /// Multiplicative priority boost for an issue type under this use case.
    /// 1.0 is neutral; boosts are > 1.0.
    pub fn weight(&self, issue: IssueType) -> f64 {
        match self {
            UseCase::General => 1.0,
            UseCase::Ml => match issue {
                IssueType::DuplicateRows => 1.5,
                IssueType::SimilarColumns => 1.4,
                IssueType::MissingValues => 1.3,
                IssueType::NumericAsString => 1.3,
                IssueType::BooleanAsString => 1.2,
                IssueType::Outliers => 1.2,
                _ => 1.0,
            },
            UseCase::Analytics => match issue {
                IssueType::MissingValues => 1.5,
                IssueType::InconsistentDateFormat => 1.4,
                IssueType::Outliers => 1.3,
                IssueType::InconsistentCase => 1.2,
                _ => 1.0,
            },
            UseCase::Export => match issue {
                IssueType::InconsistentDateFormat => 1.5,
                IssueType::WhitespacePadding => 1.4,
                IssueType::InconsistentCase => 1.3,
                IssueType::NumericAsString => 1.3,
                _ => 1.0,
            },
        }
    }
}

impl FromStr for UseCase {
    type Err = SmelterError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "general" => Ok(UseCase::General),
            "ml" => Ok(UseCase::Ml),
            "analytics" => Ok(UseCase::Analytics),
            "export" => Ok(UseCase::Export),
            other => Err(SmelterError::Config(format!(
                "unknown use case '{other}' (expected general, ml, analytics or export)"
            ))),
        }
    }
}

/// Outlier detection method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlierMethod {
    /// Interquartile-range fences.
    #[default]
    Iqr,
    /// Z-score distance from the mean.
    ZScore,
}

impl OutlierMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutlierMethod::Iqr => "iqr",
            OutlierMethod::ZScore => "z_score",
        }
    }
}

/// Detection thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thresholds {
    /// Minimum similarity score for a `similar_columns` finding, applied to
    /// both the name and the value signal.
    pub min_similarity: f64,
    /// Columns whose distinct-count ratio falls below this cannot reach a
    /// high Jaccard similarity and are never compared by value.
    pub min_size_ratio: f64,
    /// Outlier detection method.
    pub outlier_method: OutlierMethod,
    /// Fence multiplier (IQR) or z-score cutoff.
    pub outlier_threshold: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_similarity: 0.8,
            min_size_ratio: 0.5,
            outlier_method: OutlierMethod::Iqr,
            outlier_threshold: 1.5,
        }
    }
}

/// Top-level configuration for one analysis pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Weighting profile for suggestion priority.
    pub use_case: UseCase,
    /// Suggestion list is truncated to this length, after sorting.
    pub max_suggestions: usize,
    /// Detection thresholds.
    pub thresholds: Thresholds,
    /// Detectors to run, in registry order.
    pub detectors: Vec<DetectorKind>,
    /// Profiling options.
    pub profile: ProfileConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            use_case: UseCase::General,
            max_suggestions: 50,
            thresholds: Thresholds::default(),
            detectors: DetectorKind::all().to_vec(),
            profile: ProfileConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Create a configuration for a use case given by tag.
    pub fn for_use_case(tag: &str) -> Result<Self> {
        Ok(Self {
            use_case: tag.parse()?,
            ..Self::default()
        })
    }

    /// Validate thresholds and limits. Called before any detector runs.
    pub fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        if !(t.min_similarity > 0.0 && t.min_similarity <= 1.0) {
            return Err(SmelterError::Config(format!(
                "min_similarity must be in (0, 1], got {}",
                t.min_similarity
            )));
        }
        if !(t.min_size_ratio > 0.0 && t.min_size_ratio <= 1.0) {
            return Err(SmelterError::Config(format!(
                "min_size_ratio must be in (0, 1], got {}",
                t.min_size_ratio
            )));
        }
        if !(t.outlier_threshold > 0.0) {
            return Err(SmelterError::Config(format!(
                "outlier_threshold must be positive, got {}",
                t.outlier_threshold
            )));
        }
        if self.max_suggestions == 0 {
            return Err(SmelterError::Config(
                "max_suggestions must be at least 1".to_string(),
            ));
        }
        if self.profile.sample_size == 0 {
            return Err(SmelterError::Config(
                "profile.sample_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_use_case_parsing() {
        assert_eq!("ml".parse::<UseCase>().unwrap(), UseCase::Ml);
        assert_eq!("general".parse::<UseCase>().unwrap(), UseCase::General);
        assert!("warehouse".parse::<UseCase>().is_err());
    }

    #[test]
    fn test_general_weights_are_neutral() {
        for issue in IssueType::all() {
            assert_eq!(UseCase::General.weight(*issue), 1.0);
        }
    }

    #[test]
    fn test_ml_boosts_duplicates() {
        assert!(UseCase::Ml.weight(IssueType::DuplicateRows) > 1.0);
        assert!(UseCase::Ml.weight(IssueType::SimilarColumns) > 1.0);
        assert_eq!(UseCase::Ml.weight(IssueType::InconsistentCase), 1.0);
    }

    #[test]
    fn test_validate_rejects_bad_thresholds() {
        let mut config = AnalysisConfig::default();
        config.thresholds.min_similarity = 0.0;
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default();
        config.thresholds.min_similarity = 1.5;
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default();
        config.max_suggestions = 0;
        assert!(config.validate().is_err());

        assert!(AnalysisConfig::default().validate().is_ok());
    }
}
