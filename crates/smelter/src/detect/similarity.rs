//! Approximate column-similarity detection.
//!
//! Finds pairs of columns that are likely duplicates or near-duplicates,
//! without comparing all pairs. Two independent signals, each following the
//! same candidate-generation-then-score shape:
//!
//! - **Name**: an inverted index from character n-grams of the lower-cased
//!   column names blocks candidate pairs down to those sharing at least one
//!   n-gram; survivors are scored with a normalized edit-distance
//!   similarity.
//! - **Value**: each column gets a fixed-size minhash signature over its
//!   distinct values (computed once, via the shared cache); locality-
//!   sensitive-hash bands over the signatures block candidate pairs down to
//!   columns agreeing on at least one band. A cheap distinct-count size
//!   filter then discards pairs that cannot reach a high Jaccard similarity
//!   before any scoring happens.
//!
//! Candidate pairs are normalized and scored in sorted name order, so the
//! finding set and its ordering are invariant to column order in the input.
//! A pair may be reported once per signal; the two signals do not dedupe
//! against each other.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::warn;

use crate::cache::{ComputationCache, ValueSignature, SIGNATURE_SIZE};
use crate::config::Thresholds;
use crate::error::Result;
use crate::profile::DatasetProfile;
use crate::table::DataTable;

use super::engine::Detector;
use super::finding::{DetectorKind, Finding, IssueType, Severity};

/// Guards threshold comparisons against float rounding: a score computed as
/// `1 - d/n` can land one ulp under the configured threshold literal.
const SCORE_EPSILON: f64 = 1e-9;

/// Configuration for the similarity detector.
#[derive(Debug, Clone)]
pub struct SimilarityConfig {
    /// Minimum score for a finding, both signals.
    pub min_similarity: f64,
    /// Pairs whose distinct-count ratio falls below this are skipped.
    pub min_size_ratio: f64,
    /// Character n-gram size for name blocking. Bigrams by default: a
    /// single edit in a name of length >= 4 always leaves a shared bigram,
    /// so blocking loses no pair that could reach the 0.8 threshold.
    /// Trigrams would be cheaper but miss transposed names like
    /// `email`/`emial`, whose trigram sets are disjoint.
    pub ngram_size: usize,
    /// Number of LSH bands over the minhash signature.
    pub lsh_bands: usize,
    /// Columns at or below this many distinct values are compared with
    /// exact Jaccard instead of the signature estimate.
    pub exact_jaccard_limit: usize,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            min_similarity: 0.8,
            min_size_ratio: 0.5,
            ngram_size: 2,
            lsh_bands: 32,
            exact_jaccard_limit: 512,
        }
    }
}

/// Detects similar or potentially duplicate columns.
pub struct SimilarityDetector {
    config: SimilarityConfig,
}

impl SimilarityDetector {
    /// Create a detector from analysis thresholds.
    pub fn new(thresholds: &Thresholds) -> Self {
        Self::with_config(SimilarityConfig {
            min_similarity: thresholds.min_similarity,
            min_size_ratio: thresholds.min_size_ratio,
            ..SimilarityConfig::default()
        })
    }

    /// Create a detector with explicit configuration.
    pub fn with_config(config: SimilarityConfig) -> Self {
        Self { config }
    }

    fn pair_finding(&self, a: &str, b: &str, method: &'static str, score: f64) -> Finding {
        Finding::new(
            IssueType::SimilarColumns,
            DetectorKind::Similarity,
            Severity::Medium,
            format!("Columns '{a}' and '{b}' appear similar ({method} similarity {score:.2})"),
        )
        .with_columns(vec![a.to_string(), b.to_string()])
        .with_confidence(score)
        .with_detail("method", method)
        .with_detail("score", round3(score))
    }

    /// Name signal: block by shared n-grams, score by edit distance.
    fn name_findings(&self, names: &[&str]) -> Vec<Finding> {
        let mut findings = Vec::new();
        if names.len() < 2 {
            return findings;
        }

        let lowered: Vec<String> = names.iter().map(|n| n.to_lowercase()).collect();

        // Inverted index: n-gram -> columns containing it. Names are already
        // sorted, so bucket contents are ascending and pairs come out
        // normalized.
        let mut index: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (i, name) in lowered.iter().enumerate() {
            for gram in name_ngrams(name, self.config.ngram_size) {
                index.entry(gram).or_default().push(i);
            }
        }

        let mut candidates: BTreeSet<(usize, usize)> = BTreeSet::new();
        for bucket in index.values() {
            for (x, &i) in bucket.iter().enumerate() {
                for &j in &bucket[x + 1..] {
                    candidates.insert((i, j));
                }
            }
        }

        for (i, j) in candidates {
            let score = name_similarity(&lowered[i], &lowered[j]);
            if score + SCORE_EPSILON >= self.config.min_similarity {
                findings.push(self.pair_finding(names[i], names[j], "name", score));
            }
        }

        findings
    }

    /// Value signal: block by LSH bands over minhash signatures, filter by
    /// distinct-count ratio, then score with Jaccard similarity.
    fn value_findings(
        &self,
        names: &[&str],
        profile: &DatasetProfile,
        cache: &ComputationCache<'_>,
    ) -> Vec<Finding> {
        let mut findings = Vec::new();
        let rows_per_band = SIGNATURE_SIZE / self.config.lsh_bands.max(1);

        // Columns with fewer than two distinct values have degenerate
        // signatures and are excluded. A column whose signature cannot be
        // computed is skipped, not fatal.
        let mut eligible: Vec<(&str, usize, Arc<ValueSignature>)> = Vec::new();
        for &name in names {
            let Some(column) = profile.column(name) else {
                continue;
            };
            if column.distinct_count < 2 {
                continue;
            }
            match cache.signature(name) {
                Ok(signature) => eligible.push((name, column.distinct_count, signature)),
                Err(error) => {
                    warn!(column = name, %error, "skipping column for value similarity");
                }
            }
        }

        let mut buckets: BTreeMap<(usize, u64), Vec<usize>> = BTreeMap::new();
        for (idx, (_, _, signature)) in eligible.iter().enumerate() {
            for band in 0..self.config.lsh_bands {
                buckets
                    .entry((band, signature.band_hash(band, rows_per_band)))
                    .or_default()
                    .push(idx);
            }
        }

        let mut candidates: BTreeSet<(usize, usize)> = BTreeSet::new();
        for bucket in buckets.values() {
            for (x, &i) in bucket.iter().enumerate() {
                for &j in &bucket[x + 1..] {
                    candidates.insert((i, j));
                }
            }
        }

        for (i, j) in candidates {
            let (name_a, distinct_a, sig_a) = &eligible[i];
            let (name_b, distinct_b, sig_b) = &eligible[j];

            // Size filter: a large distinct-count imbalance bounds Jaccard
            // below any useful threshold, so skip before scoring.
            let ratio = *distinct_a.min(distinct_b) as f64 / *distinct_a.max(distinct_b) as f64;
            if ratio < self.config.min_size_ratio {
                continue;
            }

            let score = self.pair_score(name_a, name_b, distinct_a, distinct_b, sig_a, sig_b, cache);
            if score + SCORE_EPSILON >= self.config.min_similarity {
                findings.push(self.pair_finding(name_a, name_b, "value", score));
            }
        }

        findings
    }

    /// Exact Jaccard for small columns, signature estimate otherwise.
    #[allow(clippy::too_many_arguments)]
    fn pair_score(
        &self,
        name_a: &str,
        name_b: &str,
        distinct_a: &usize,
        distinct_b: &usize,
        sig_a: &ValueSignature,
        sig_b: &ValueSignature,
        cache: &ComputationCache<'_>,
    ) -> f64 {
        if *distinct_a <= self.config.exact_jaccard_limit
            && *distinct_b <= self.config.exact_jaccard_limit
        {
            if let (Ok(set_a), Ok(set_b)) = (cache.value_set(name_a), cache.value_set(name_b)) {
                if !set_a.truncated && !set_b.truncated {
                    return set_a.jaccard(&set_b);
                }
            }
        }
        sig_a.estimated_jaccard(sig_b)
    }
}

impl Detector for SimilarityDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Similarity
    }

    fn detect(
        &self,
        _table: &DataTable,
        profile: &DatasetProfile,
        cache: &ComputationCache<'_>,
    ) -> Result<Vec<Finding>> {
        // Sorting names first makes candidate generation and scoring a pure
        // function of the column set, independent of table column order.
        let mut names: Vec<&str> = profile.column_names().collect();
        names.sort_unstable();

        let mut findings = self.name_findings(&names);
        findings.extend(self.value_findings(&names, profile, cache));
        Ok(findings)
    }
}

/// Distinct character n-grams of a name. Names shorter than the n-gram size
/// contribute themselves as a single gram so they still land in a bucket.
fn name_ngrams(name: &str, n: usize) -> BTreeSet<String> {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() < n {
        return BTreeSet::from([name.to_string()]);
    }
    chars.windows(n).map(|w| w.iter().collect()).collect()
}

/// Normalized edit-distance similarity in [0, 1]: `1 - d / max_len`, where
/// `d` is the optimal-string-alignment distance (Levenshtein plus adjacent
/// transpositions at cost 1). Transpositions are counted as single edits so
/// that swapped-letter names like `email`/`emial` score 0.8 rather than 0.6;
/// the 0.8 default threshold is calibrated against this function.
pub fn name_similarity(a: &str, b: &str) -> f64 {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    let max_len = len_a.max(len_b);
    if max_len == 0 {
        return 1.0;
    }
    1.0 - osa_distance(a, b) as f64 / max_len as f64
}

/// Optimal string alignment distance: Levenshtein with adjacent
/// transpositions counted as one edit.
fn osa_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (len_a, len_b) = (a.len(), b.len());

    if len_a == 0 {
        return len_b;
    }
    if len_b == 0 {
        return len_a;
    }

    let mut d = vec![vec![0usize; len_b + 1]; len_a + 1];
    for (i, row) in d.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=len_b {
        d[0][j] = j;
    }

    for i in 1..=len_a {
        for j in 1..=len_b {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let mut best = (d[i - 1][j] + 1)
                .min(d[i][j - 1] + 1)
                .min(d[i - 1][j - 1] + cost);
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                best = best.min(d[i - 2][j - 2] + 1);
            }
            d[i][j] = best;
        }
    }

    d[len_a][len_b]
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
