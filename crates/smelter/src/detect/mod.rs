//! Issue detection: finding model, detector registry, and the detectors.

mod duplicates;
mod engine;
mod finding;
mod formats;
mod missing;
mod outliers;
mod similarity;
mod types;

pub use duplicates::DuplicateDetector;
pub use engine::{DetectionEngine, Detector};
pub use finding::{DetectorKind, Finding, IssueType, Severity};
pub use formats::FormatDetector;
pub use missing::MissingDetector;
pub use outliers::OutlierDetector;
pub use similarity::{name_similarity, SimilarityConfig, SimilarityDetector};
pub use types::TypeDetector;
