//! Shared computation cache for per-column derived data.
//!
//! Every detector reads derived column data (null masks, distinct value
//! sets, minhash signatures, numeric summaries) through one cache instance
//! so the work happens once, no matter how many detectors ask or from which
//! thread. The guarantee is at-most-one computation per (column, derived
//! kind) key: the slot map lock is held only long enough to fetch or insert
//! a slot, and `OnceCell::get_or_init` serializes the first computation of
//! that one key while other keys proceed in parallel. Failures are memoized
//! too, so a column that cannot be derived is computed once and skipped
//! consistently thereafter.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use once_cell::sync::{Lazy, OnceCell};

use crate::error::{Result, SmelterError};
use crate::profile::NumericSummary;
use crate::table::DataTable;

/// Number of minhash permutations in a value signature.
pub const SIGNATURE_SIZE: usize = 128;

/// Cap on the number of distinct values materialized per column.
pub const MAX_VALUE_SET: usize = 10_000;

static PERMUTATION_SEEDS: Lazy<Vec<u64>> = Lazy::new(|| {
    (0..SIGNATURE_SIZE as u64).map(|i| splitmix64(i + 1)).collect()
});

/// 64-bit finalizer used to derive deterministic, well-mixed hashes.
/// `std`'s default hasher keys are not contractually stable across releases;
/// signatures must be identical on every build.
pub(crate) fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

/// FNV-style string hash mixed with a permutation seed.
fn seeded_hash(seed: u64, value: &str) -> u64 {
    let mut h = 0xcbf2_9ce4_8422_2325u64 ^ splitmix64(seed);
    for byte in value.as_bytes() {
        h ^= u64::from(*byte);
        h = h.wrapping_mul(0x0000_0100_0000_01b3);
    }
    splitmix64(h)
}

/// Distinct non-missing values of a column, bounded by [`MAX_VALUE_SET`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueSet {
    /// Distinct values in sorted order.
    pub values: BTreeSet<String>,
    /// True when the column had more distinct values than the cap.
    pub truncated: bool,
}

impl ValueSet {
    /// Exact Jaccard similarity with another value set.
    pub fn jaccard(&self, other: &ValueSet) -> f64 {
        if self.values.is_empty() && other.values.is_empty() {
            return 0.0;
        }
        let intersection = self.values.intersection(&other.values).count();
        let union = self.values.len() + other.values.len() - intersection;
        if union == 0 {
            0.0
        } else {
            intersection as f64 / union as f64
        }
    }
}

/// Fixed-size minhash fingerprint of a column's distinct-value set, enabling
/// fast Jaccard estimation without materializing the sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueSignature {
    mins: Vec<u64>,
}

impl ValueSignature {
    /// Compute the signature from a stream of cell values. Duplicates do not
    /// change the minimum, so streaming the raw column is equivalent to
    /// hashing the distinct set.
    pub fn of_values<'v>(values: impl Iterator<Item = &'v str>) -> Self {
        let mut mins = vec![u64::MAX; SIGNATURE_SIZE];
        for value in values {
            if DataTable::is_missing(value) {
                continue;
            }
            for (min, seed) in mins.iter_mut().zip(PERMUTATION_SEEDS.iter()) {
                let h = seeded_hash(*seed, value);
                if h < *min {
                    *min = h;
                }
            }
        }
        Self { mins }
    }

    /// Estimated Jaccard similarity: the fraction of matching components.
    pub fn estimated_jaccard(&self, other: &ValueSignature) -> f64 {
        let matching = self
            .mins
            .iter()
            .zip(other.mins.iter())
            .filter(|(a, b)| a == b)
            .count();
        matching as f64 / SIGNATURE_SIZE as f64
    }

    /// Deterministic hash of one LSH band of the signature.
    pub fn band_hash(&self, band: usize, rows_per_band: usize) -> u64 {
        let start = band * rows_per_band;
        let end = (start + rows_per_band).min(self.mins.len());
        let mut h = splitmix64(band as u64 ^ 0xa076_1d64_78bd_642f);
        for min in &self.mins[start..end] {
            h = splitmix64(h ^ *min);
        }
        h
    }

    /// True when the signature saw no values at all.
    pub fn is_empty(&self) -> bool {
        self.mins.iter().all(|&m| m == u64::MAX)
    }
}

type SlotResult<T> = std::result::Result<T, String>;
type Slot<T> = Arc<OnceCell<SlotResult<T>>>;

/// Per-derived-kind slot map with single-flight semantics.
struct SlotMap<T> {
    slots: Mutex<HashMap<String, Slot<T>>>,
}

impl<T: Clone> SlotMap<T> {
    fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn get_or_compute(&self, column: &str, compute: impl FnOnce() -> Result<T>) -> Result<T> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.entry(column.to_string()).or_default().clone()
        };
        slot.get_or_init(|| compute().map_err(|e| e.to_string()))
            .clone()
            .map_err(|message| SmelterError::ColumnComputation {
                column: column.to_string(),
                message,
            })
    }
}

/// Memoizing cache over one table's derived column data.
pub struct ComputationCache<'a> {
    table: &'a DataTable,
    null_masks: SlotMap<Arc<Vec<bool>>>,
    value_sets: SlotMap<Arc<ValueSet>>,
    signatures: SlotMap<Arc<ValueSignature>>,
    numeric_summaries: SlotMap<Option<Arc<NumericSummary>>>,
}

impl<'a> ComputationCache<'a> {
    /// Create a cache over a table.
    pub fn new(table: &'a DataTable) -> Self {
        Self {
            table,
            null_masks: SlotMap::new(),
            value_sets: SlotMap::new(),
            signatures: SlotMap::new(),
            numeric_summaries: SlotMap::new(),
        }
    }

    /// The table this cache reads from.
    pub fn table(&self) -> &'a DataTable {
        self.table
    }

    fn column_index(&self, column: &str) -> Result<usize> {
        self.table
            .column_index(column)
            .ok_or_else(|| SmelterError::UnknownColumn(column.to_string()))
    }

    /// Boolean mask of missing values for a column.
    pub fn null_mask(&self, column: &str) -> Result<Arc<Vec<bool>>> {
        self.null_masks.get_or_compute(column, || {
            let index = self.column_index(column)?;
            let mask = self
                .table
                .column_values(index)
                .map(DataTable::is_missing)
                .collect();
            Ok(Arc::new(mask))
        })
    }

    /// Distinct non-missing values of a column, capped at [`MAX_VALUE_SET`].
    pub fn value_set(&self, column: &str) -> Result<Arc<ValueSet>> {
        self.value_sets.get_or_compute(column, || {
            let index = self.column_index(column)?;
            let mut values = BTreeSet::new();
            let mut truncated = false;
            for value in self.table.column_values(index) {
                if DataTable::is_missing(value) {
                    continue;
                }
                if values.len() >= MAX_VALUE_SET && !values.contains(value) {
                    truncated = true;
                    continue;
                }
                values.insert(value.to_string());
            }
            Ok(Arc::new(ValueSet { values, truncated }))
        })
    }

    /// Minhash signature over a column's distinct values.
    pub fn signature(&self, column: &str) -> Result<Arc<ValueSignature>> {
        self.signatures.get_or_compute(column, || {
            let index = self.column_index(column)?;
            Ok(Arc::new(ValueSignature::of_values(
                self.table.column_values(index),
            )))
        })
    }

    /// Numeric summary over the parseable values of a column, or None when
    /// the column has no parseable values.
    pub fn numeric_summary(&self, column: &str) -> Result<Option<Arc<NumericSummary>>> {
        self.numeric_summaries.get_or_compute(column, || {
            let index = self.column_index(column)?;
            let summary = NumericSummary::from_values(
                self.table
                    .column_values(index)
                    .filter(|v| !DataTable::is_missing(v))
                    .filter_map(|v| v.trim().parse::<f64>().ok()),
            );
            Ok(summary.map(Arc::new))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn table(columns: Vec<&str>, rows: Vec<Vec<&str>>) -> DataTable {
        DataTable::new(
            columns.into_iter().map(String::from).collect(),
            rows.into_iter()
                .map(|r| r.into_iter().map(String::from).collect())
                .collect(),
        )
    }

    #[test]
    fn test_value_set_distinct_and_sorted() {
        let t = table(
            vec!["c"],
            vec![vec!["b"], vec!["a"], vec![""], vec!["b"], vec!["c"]],
        );
        let cache = ComputationCache::new(&t);
        let set = cache.value_set("c").unwrap();

        assert_eq!(
            set.values.iter().collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );
        assert!(!set.truncated);
    }

    #[test]
    fn test_null_mask() {
        let t = table(vec!["c"], vec![vec!["x"], vec![""], vec!["y"]]);
        let cache = ComputationCache::new(&t);
        assert_eq!(*cache.null_mask("c").unwrap(), vec![false, true, false]);
    }

    #[test]
    fn test_unknown_column_is_error() {
        let t = table(vec!["c"], vec![vec!["x"]]);
        let cache = ComputationCache::new(&t);
        assert!(matches!(
            cache.value_set("nope"),
            Err(SmelterError::ColumnComputation { .. })
        ));
    }

    #[test]
    fn test_signature_identical_for_same_value_set() {
        let t = table(
            vec!["a", "b"],
            vec![
                vec!["active", "inactive"],
                vec!["active", "active"],
                vec!["inactive", "active"],
            ],
        );
        let cache = ComputationCache::new(&t);
        let sig_a = cache.signature("a").unwrap();
        let sig_b = cache.signature("b").unwrap();

        assert_eq!(*sig_a, *sig_b);
        assert_eq!(sig_a.estimated_jaccard(&sig_b), 1.0);
    }

    #[test]
    fn test_signature_disjoint_sets_mostly_differ() {
        let t = table(
            vec!["a", "b"],
            vec![
                vec!["alpha", "delta"],
                vec!["beta", "epsilon"],
                vec!["gamma", "zeta"],
            ],
        );
        let cache = ComputationCache::new(&t);
        let sig_a = cache.signature("a").unwrap();
        let sig_b = cache.signature("b").unwrap();

        assert!(sig_a.estimated_jaccard(&sig_b) < 0.2);
    }

    #[test]
    fn test_jaccard_exact() {
        let set = |values: &[&str]| ValueSet {
            values: values.iter().map(|s| s.to_string()).collect(),
            truncated: false,
        };
        assert_eq!(set(&["a", "b"]).jaccard(&set(&["a", "b"])), 1.0);
        assert_eq!(set(&["a", "b"]).jaccard(&set(&["c"])), 0.0);
        let half = set(&["a", "b"]).jaccard(&set(&["b", "c"]));
        assert!((half - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_flight_computes_once() {
        let counter = AtomicUsize::new(0);
        let slots: SlotMap<usize> = SlotMap::new();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    let value = slots
                        .get_or_compute("col", || {
                            counter.fetch_add(1, Ordering::SeqCst);
                            Ok(7)
                        })
                        .unwrap();
                    assert_eq!(value, 7);
                });
            }
        });

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failures_are_memoized() {
        let counter = AtomicUsize::new(0);
        let slots: SlotMap<usize> = SlotMap::new();

        for _ in 0..3 {
            let result = slots.get_or_compute("col", || {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(SmelterError::UnknownColumn("col".to_string()))
            });
            assert!(result.is_err());
        }

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
