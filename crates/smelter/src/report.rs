//! Report: the main user-facing analysis interface.

use std::collections::HashSet;
use std::path::Path;

use tracing::{info, warn};

use crate::config::AnalysisConfig;
use crate::detect::{DetectionEngine, Finding, Severity};
use crate::error::Result;
use crate::profile::{profile_dataset, DatasetProfile};
use crate::suggest::{ConflictResolver, ExecutionScheduler, Suggestion, SuggestionScorer};
use crate::table::{read_delimited, DataTable, ReadOptions, SourceInfo};
use crate::transform::{TransformEngine, TransformationResult};

/// Result of analyzing a dataset: profile, findings, and an ordered,
/// conflict-free suggestion list ready to apply.
pub struct Report {
    table: DataTable,
    source: Option<SourceInfo>,
    profile: DatasetProfile,
    findings: Vec<Finding>,
    suggestions: Vec<Suggestion>,
}

impl Report {
    /// Analyze a table: profile, detect, score, resolve conflicts and
    /// schedule. Configuration is validated before anything runs.
    pub fn analyze(table: DataTable, config: AnalysisConfig) -> Result<Report> {
        config.validate()?;

        let profile = profile_dataset(&table, &config.profile);
        let findings = DetectionEngine::new(&config).run(&table, &profile);

        let scored =
            SuggestionScorer::new().score(&findings, config.use_case, config.max_suggestions);
        let resolved = ConflictResolver::resolve(scored);
        let suggestions = ExecutionScheduler::schedule(resolved);

        info!(
            findings = findings.len(),
            suggestions = suggestions.len(),
            "analysis complete"
        );

        Ok(Report {
            table,
            source: None,
            profile,
            findings,
            suggestions,
        })
    }

    /// Load a delimited file and analyze it.
    pub fn analyze_file(path: impl AsRef<Path>, config: AnalysisConfig) -> Result<Report> {
        let (table, source) = read_delimited(path, &ReadOptions::default())?;
        let mut report = Self::analyze(table, config)?;
        report.source = Some(source);
        Ok(report)
    }

    /// The analyzed table (unmodified original).
    pub fn table(&self) -> &DataTable {
        &self.table
    }

    /// Source metadata, when the data came from a file.
    pub fn source(&self) -> Option<&SourceInfo> {
        self.source.as_ref()
    }

    /// The dataset profile.
    pub fn profile(&self) -> &DatasetProfile {
        &self.profile
    }

    /// All detected findings.
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Suggestions in execution order.
    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    /// Data quality score from 0 to 100: each finding subtracts a penalty
    /// scaled by severity and confidence.
    pub fn quality_score(&self) -> u8 {
        if self.profile.row_count == 0 {
            return 100;
        }
        let mut score = 100.0f64;
        for finding in &self.findings {
            let penalty = match finding.severity {
                Severity::High => 10.0,
                Severity::Medium => 5.0,
                Severity::Low => 2.0,
            };
            score -= penalty * finding.confidence;
        }
        score.clamp(0.0, 100.0) as u8
    }

    /// Apply the selected suggestions by id, in scheduled order, to a copy
    /// of the table. Returns the cleaned table and the ordered audit trail.
    /// Unknown ids are skipped with a warning.
    pub fn apply(&self, ids: &[u32]) -> Result<(DataTable, Vec<TransformationResult>)> {
        let known: HashSet<u32> = self.suggestions.iter().map(|s| s.id).collect();
        for &id in ids {
            if !known.contains(&id) {
                warn!(id, "suggestion id not found, skipping");
            }
        }

        let wanted: HashSet<u32> = ids.iter().copied().collect();
        let engine = TransformEngine::new();
        let mut table = self.table.clone();
        let mut applied = Vec::new();

        for suggestion in &self.suggestions {
            if !wanted.contains(&suggestion.id) {
                continue;
            }
            let result = engine.apply(&suggestion.op, &mut table)?;
            info!(
                id = suggestion.id,
                action = %suggestion.action,
                rows_affected = result.rows_affected,
                "applied suggestion"
            );
            applied.push(result);
        }

        Ok((table, applied))
    }

    /// Apply every suggestion, in scheduled order.
    pub fn apply_all(&self) -> Result<(DataTable, Vec<TransformationResult>)> {
        let ids: Vec<u32> = self.suggestions.iter().map(|s| s.id).collect();
        self.apply(&ids)
    }

    /// Human-readable analysis summary.
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!(
                "Dataset: {} rows x {} columns",
                self.profile.row_count, self.profile.column_count
            ),
            format!(
                "Memory: {:.1} KB",
                self.profile.memory_bytes as f64 / 1024.0
            ),
            format!("Duplicate rows: {}", self.profile.duplicate_row_count),
            format!("Data quality score: {}/100", self.quality_score()),
            format!("Issues found: {}", self.findings.len()),
            format!("Suggestions: {}", self.suggestions.len()),
            String::new(),
        ];

        for severity in [Severity::High, Severity::Medium, Severity::Low] {
            let issues: Vec<&Finding> = self
                .findings
                .iter()
                .filter(|f| f.severity == severity)
                .collect();
            if issues.is_empty() {
                continue;
            }
            lines.push(format!(
                "  [{}] {} issue(s)",
                severity.label().to_uppercase(),
                issues.len()
            ));
            for issue in issues.iter().take(5) {
                lines.push(format!("    - {}", issue.message));
            }
            if issues.len() > 5 {
                lines.push(format!("    ... and {} more", issues.len() - 5));
            }
        }

        lines.join("\n")
    }
}
