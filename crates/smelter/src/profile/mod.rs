//! Dataset and column profiling.

mod column;
mod dataset;
mod profiler;

pub use column::{ColumnProfile, ColumnType, NumericSummary, PatternTags};
pub use dataset::{DatasetProfile, SampleInfo};
pub use profiler::{profile_dataset, ProfileConfig};

pub(crate) use profiler::boolean_token_value;
