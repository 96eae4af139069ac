//! Detector registry and execution engine.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread;

use tracing::{debug, warn};

use crate::cache::ComputationCache;
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::profile::DatasetProfile;
use crate::table::DataTable;

use super::duplicates::DuplicateDetector;
use super::finding::{DetectorKind, Finding};
use super::formats::FormatDetector;
use super::missing::MissingDetector;
use super::outliers::OutlierDetector;
use super::similarity::SimilarityDetector;
use super::types::TypeDetector;

/// A detector over one table. Detectors only read: the table, the profile
/// and the shared cache are all immutable from their point of view.
pub trait Detector: Send + Sync {
    /// Which detector family this is.
    fn kind(&self) -> DetectorKind;

    /// Run detection and return findings.
    fn detect(
        &self,
        table: &DataTable,
        profile: &DatasetProfile,
        cache: &ComputationCache<'_>,
    ) -> Result<Vec<Finding>>;
}

/// Runs the configured detectors over a table and collects their findings.
pub struct DetectionEngine {
    detectors: Vec<Box<dyn Detector>>,
}

impl DetectionEngine {
    /// Build the engine from configuration. The registry is a compile-time
    /// table: one entry per [`DetectorKind`], instantiated in registry order
    /// and filtered by the enabled set.
    pub fn new(config: &AnalysisConfig) -> Self {
        let detectors = DetectorKind::all()
            .iter()
            .filter(|kind| config.detectors.contains(kind))
            .map(|kind| -> Box<dyn Detector> {
                match kind {
                    DetectorKind::Missing => Box::new(MissingDetector),
                    DetectorKind::Duplicates => Box::new(DuplicateDetector),
                    DetectorKind::Types => Box::new(TypeDetector),
                    DetectorKind::Formats => Box::new(FormatDetector),
                    DetectorKind::Outliers => Box::new(OutlierDetector::new(&config.thresholds)),
                    DetectorKind::Similarity => {
                        Box::new(SimilarityDetector::new(&config.thresholds))
                    }
                }
            })
            .collect();

        Self { detectors }
    }

    /// Run all detectors and return their findings in registry order.
    ///
    /// Detector kinds run concurrently: each gets its own thread, all
    /// sharing the read-only table, profile and computation cache. Results
    /// are joined in registry order regardless of completion order, so the
    /// output is deterministic. A detector that fails or panics contributes
    /// no findings at all; the run continues with the rest.
    pub fn run(&self, table: &DataTable, profile: &DatasetProfile) -> Vec<Finding> {
        let cache = ComputationCache::new(table);

        let results: Vec<Vec<Finding>> = thread::scope(|scope| {
            let handles: Vec<_> = self
                .detectors
                .iter()
                .map(|detector| {
                    let cache = &cache;
                    scope.spawn(move || {
                        let name = detector.kind().name();
                        let outcome = catch_unwind(AssertUnwindSafe(|| {
                            detector.detect(table, profile, cache)
                        }));
                        match outcome {
                            Ok(Ok(findings)) => {
                                debug!(detector = name, count = findings.len(), "detector finished");
                                findings
                            }
                            Ok(Err(error)) => {
                                warn!(detector = name, %error, "detector failed, skipping");
                                Vec::new()
                            }
                            Err(_) => {
                                warn!(detector = name, "detector panicked, skipping");
                                Vec::new()
                            }
                        }
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or_default())
                .collect()
        });

        results.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::finding::{IssueType, Severity};
    use crate::error::SmelterError;
    use crate::profile::{profile_dataset, ProfileConfig};

    fn table(columns: Vec<&str>, rows: Vec<Vec<&str>>) -> DataTable {
        DataTable::new(
            columns.into_iter().map(String::from).collect(),
            rows.into_iter()
                .map(|r| r.into_iter().map(String::from).collect())
                .collect(),
        )
    }

    struct FailingDetector;

    impl Detector for FailingDetector {
        fn kind(&self) -> DetectorKind {
            DetectorKind::Types
        }

        fn detect(
            &self,
            _table: &DataTable,
            _profile: &DatasetProfile,
            _cache: &ComputationCache<'_>,
        ) -> Result<Vec<Finding>> {
            Err(SmelterError::Detector {
                detector: "types".to_string(),
                message: "boom".to_string(),
            })
        }
    }

    struct PanickingDetector;

    impl Detector for PanickingDetector {
        fn kind(&self) -> DetectorKind {
            DetectorKind::Formats
        }

        fn detect(
            &self,
            _table: &DataTable,
            _profile: &DatasetProfile,
            _cache: &ComputationCache<'_>,
        ) -> Result<Vec<Finding>> {
            panic!("detector bug");
        }
    }

    #[test]
    fn test_run_collects_in_registry_order() {
        let t = table(
            vec!["a"],
            vec![vec![""], vec!["x"], vec!["x"], vec!["y"]],
        );
        let profile = profile_dataset(&t, &ProfileConfig::default());
        let engine = DetectionEngine::new(&AnalysisConfig::default());
        let findings = engine.run(&t, &profile);

        // Missing runs before similarity in registry order.
        let missing_pos = findings
            .iter()
            .position(|f| f.issue_type == IssueType::MissingValues);
        assert!(missing_pos.is_some());
    }

    #[test]
    fn test_failing_detector_is_isolated() {
        let t = table(vec!["a"], vec![vec![""], vec!["x"]]);
        let profile = profile_dataset(&t, &ProfileConfig::default());
        let engine = DetectionEngine {
            detectors: vec![Box::new(MissingDetector), Box::new(FailingDetector)],
        };
        let findings = engine.run(&t, &profile);

        // The failing detector contributes nothing; the rest still report.
        assert!(findings
            .iter()
            .any(|f| f.issue_type == IssueType::MissingValues));
        assert!(!findings
            .iter()
            .any(|f| f.issue_type == IssueType::NumericAsString));
    }

    #[test]
    fn test_panicking_detector_is_isolated() {
        let t = table(vec!["a"], vec![vec![""], vec!["x"]]);
        let profile = profile_dataset(&t, &ProfileConfig::default());
        let engine = DetectionEngine {
            detectors: vec![Box::new(PanickingDetector), Box::new(MissingDetector)],
        };
        let findings = engine.run(&t, &profile);

        assert!(findings
            .iter()
            .any(|f| f.issue_type == IssueType::MissingValues));
    }

    #[test]
    fn test_disabled_detectors_do_not_run() {
        let t = table(vec!["a"], vec![vec![""], vec!["x"]]);
        let profile = profile_dataset(&t, &ProfileConfig::default());
        let config = AnalysisConfig {
            detectors: vec![DetectorKind::Duplicates],
            ..AnalysisConfig::default()
        };
        let engine = DetectionEngine::new(&config);
        let findings = engine.run(&t, &profile);

        assert!(!findings
            .iter()
            .any(|f| f.issue_type == IssueType::MissingValues));
    }

    #[test]
    fn test_run_is_deterministic() {
        let t = table(
            vec!["email", "emial", "n"],
            vec![
                vec!["a@x.com", "a@x.com", "1"],
                vec!["b@x.com", "b@x.com", "2"],
                vec!["", "c@x.com", "3"],
            ],
        );
        let profile = profile_dataset(&t, &ProfileConfig::default());
        let engine = DetectionEngine::new(&AnalysisConfig::default());

        let first = engine.run(&t, &profile);
        let second = engine.run(&t, &profile);

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.issue_type, b.issue_type);
            assert_eq!(a.columns, b.columns);
            assert_eq!(a.severity, b.severity);
        }
    }

    #[test]
    fn test_severity_helpers() {
        assert!(Severity::High > Severity::Low);
    }
}
