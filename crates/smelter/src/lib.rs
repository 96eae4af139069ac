//! Smelter: rule-based data cleaning for tabular datasets.
//!
//! Smelter profiles a table, detects quality issues (missing values,
//! duplicates, mistyped columns, format drift, outliers, near-duplicate
//! columns), turns the findings into prioritized fix suggestions, removes
//! contradictory suggestions, schedules the survivors into phases that
//! never undo each other, and applies them.
//!
//! # Core Principles
//!
//! - **Best effort**: a failing column or detector is skipped, never fatal;
//!   only configuration errors abort an analysis.
//! - **Deterministic**: the same dataset always yields the same findings,
//!   the same suggestions, and the same execution order.
//! - **Non-destructive**: applying suggestions works on a copy and returns
//!   a full audit trail.
//!
//! # Example
//!
//! ```
//! use smelter::{AnalysisConfig, DataTable, Report};
//!
//! let table = DataTable::new(
//!     vec!["status".to_string(), "score".to_string()],
//!     vec![
//!         vec!["active ".to_string(), "1".to_string()],
//!         vec!["Active".to_string(), "2".to_string()],
//!         vec!["inactive".to_string(), "".to_string()],
//!     ],
//! );
//!
//! let report = Report::analyze(table, AnalysisConfig::default()).unwrap();
//! println!("{}", report.summary());
//!
//! let (cleaned, audit) = report.apply_all().unwrap();
//! assert_eq!(audit.len(), report.suggestions().len());
//! # let _ = cleaned;
//! ```

pub mod cache;
pub mod config;
pub mod detect;
pub mod error;
pub mod profile;
pub mod report;
pub mod suggest;
pub mod table;
pub mod transform;

pub use cache::ComputationCache;
pub use config::{AnalysisConfig, OutlierMethod, Thresholds, UseCase};
pub use detect::{
    DetectionEngine, Detector, DetectorKind, Finding, IssueType, Severity, SimilarityDetector,
};
pub use error::{Result, SmelterError};
pub use profile::{profile_dataset, ColumnProfile, ColumnType, DatasetProfile, ProfileConfig};
pub use report::Report;
pub use suggest::{ConflictResolver, ExecutionScheduler, Suggestion, SuggestionScorer};
pub use table::{read_delimited, DataTable, ReadOptions, SourceInfo};
pub use transform::{
    CaseStyle, ConflictClass, FillStrategy, Phase, TransformEngine, TransformOp,
    TransformationResult, TypeTarget,
};
