//! Applies transformation operations to a table.

use std::collections::{HashMap, HashSet};

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::OutlierMethod;
use crate::error::Result;
use crate::profile::{boolean_token_value, NumericSummary};
use crate::table::DataTable;

use super::op::{CaseStyle, FillStrategy, TransformOp, TypeTarget};

/// Input formats tried when parsing dates, most specific first. Two-digit
/// years go before `%Y`, which would otherwise accept "24" as year 24.
const DATE_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%d-%m-%Y",
];

/// Audit record for one applied transformation. The ordered list of these
/// is the audit trail consumed by downstream code generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformationResult {
    /// Transformer name.
    pub transformer: String,
    /// Parameters the transformer ran with.
    pub params: serde_json::Value,
    /// Number of rows (or cells, for cell-level operations) affected.
    pub rows_affected: usize,
    /// Columns affected.
    pub columns_affected: Vec<String>,
}

/// Applies operations to a [`DataTable`]. Unknown columns in an operation's
/// parameter list are skipped; suggestions are generated from real columns,
/// so a miss means the column was already dropped or renamed.
pub struct TransformEngine;

impl TransformEngine {
    /// Create a new transform engine.
    pub fn new() -> Self {
        Self
    }

    /// Apply one operation, mutating the table in place.
    pub fn apply(&self, op: &TransformOp, table: &mut DataTable) -> Result<TransformationResult> {
        let params = op.params();
        let (rows_affected, columns_affected) = match op {
            TransformOp::DropDuplicateRows { keep_first } => {
                let removed = self.drop_duplicate_rows(table, *keep_first);
                (removed, table.columns().to_vec())
            }
            TransformOp::DropNullRows { columns } => {
                let removed = self.drop_null_rows(table, columns);
                (removed, columns.clone())
            }
            TransformOp::StripWhitespace { columns } => {
                let changed = self.rewrite_cells(table, columns, |v| {
                    let trimmed = v.trim();
                    (trimmed != v).then(|| trimmed.to_string())
                });
                (changed, columns.clone())
            }
            TransformOp::ConvertCase { columns, style } => {
                let style = *style;
                let changed = self.rewrite_cells(table, columns, move |v| {
                    let converted = convert_case(v, style);
                    (converted != v).then_some(converted)
                });
                (changed, columns.clone())
            }
            TransformOp::BlankToNull { columns } => {
                let changed = self.rewrite_cells(table, columns, |v| {
                    DataTable::is_blank(v).then(String::new)
                });
                (changed, columns.clone())
            }
            TransformOp::StandardizeDates { columns, format } => {
                let target = validated_format(format);
                let changed = self.rewrite_cells(table, columns, move |v| {
                    let date = parse_date(v.trim())?;
                    let formatted = date.format(target).to_string();
                    (formatted != v).then_some(formatted)
                });
                (changed, columns.clone())
            }
            TransformOp::FillMissing { columns, strategy } => {
                let filled = self.fill_missing(table, columns, strategy);
                (filled, columns.clone())
            }
            TransformOp::ConvertType { columns, target } => {
                let changed = self.convert_type(table, columns, *target);
                (changed, columns.clone())
            }
            TransformOp::ClipOutliers {
                columns,
                method,
                threshold,
            } => {
                let clipped = self.clip_outliers(table, columns, *method, *threshold);
                (clipped, columns.clone())
            }
            TransformOp::DropColumns { columns } => {
                let mut dropped = Vec::new();
                for column in columns {
                    if table.drop_column(column) {
                        dropped.push(column.clone());
                    }
                }
                (table.row_count() * dropped.len(), dropped)
            }
            TransformOp::RenameColumn { from, to } => {
                if table.rename_column(from, to) {
                    (table.row_count(), vec![from.clone()])
                } else {
                    (0, Vec::new())
                }
            }
            // Merging columns is a human decision; the suggestion only
            // marks the pair for review.
            TransformOp::MergeReview { columns, .. } => (0, columns.clone()),
        };

        Ok(TransformationResult {
            transformer: op.transformer_name().to_string(),
            params,
            rows_affected,
            columns_affected,
        })
    }

    fn drop_duplicate_rows(&self, table: &mut DataTable, keep_first: bool) -> usize {
        if keep_first {
            let mut seen: HashSet<Vec<String>> = HashSet::new();
            table.retain_rows(|_, row| seen.insert(row.to_vec()))
        } else {
            let mut last_index: HashMap<Vec<String>, usize> = HashMap::new();
            for (i, row) in table.rows().enumerate() {
                last_index.insert(row.to_vec(), i);
            }
            table.retain_rows(|i, row| last_index.get(row) == Some(&i))
        }
    }

    fn drop_null_rows(&self, table: &mut DataTable, columns: &[String]) -> usize {
        let indices: Vec<usize> = columns
            .iter()
            .filter_map(|c| table.column_index(c))
            .collect();
        if indices.is_empty() {
            return 0;
        }
        table.retain_rows(|_, row| {
            indices
                .iter()
                .all(|&i| !DataTable::is_missing(row.get(i).map(String::as_str).unwrap_or("")))
        })
    }

    /// Rewrite non-missing cells of the named columns. The closure returns
    /// the new value when the cell should change. Returns cells changed.
    fn rewrite_cells(
        &self,
        table: &mut DataTable,
        columns: &[String],
        rewrite: impl Fn(&str) -> Option<String>,
    ) -> usize {
        let mut changed = 0;
        for column in columns {
            let Some(col) = table.column_index(column) else {
                continue;
            };
            for row in 0..table.row_count() {
                let value = table.get(row, col).unwrap_or("");
                if DataTable::is_missing(value) {
                    continue;
                }
                if let Some(new_value) = rewrite(value) {
                    table.set(row, col, new_value);
                    changed += 1;
                }
            }
        }
        changed
    }

    fn fill_missing(
        &self,
        table: &mut DataTable,
        columns: &[String],
        strategy: &FillStrategy,
    ) -> usize {
        let mut filled = 0;
        for column in columns {
            let Some(col) = table.column_index(column) else {
                continue;
            };

            let fill_value = match strategy {
                FillStrategy::Median => column_median(table, col).map(format_number),
                FillStrategy::Mode => column_mode(table, col),
                FillStrategy::Value(v) => Some(v.clone()),
            };
            let Some(fill_value) = fill_value else {
                continue;
            };

            for row in 0..table.row_count() {
                if DataTable::is_missing(table.get(row, col).unwrap_or("")) {
                    table.set(row, col, fill_value.clone());
                    filled += 1;
                }
            }
        }
        filled
    }

    fn convert_type(&self, table: &mut DataTable, columns: &[String], target: TypeTarget) -> usize {
        self.rewrite_cells(table, columns, move |value| {
            let trimmed = value.trim();
            let converted = match target {
                TypeTarget::Boolean => boolean_token_value(trimmed)
                    .map(|b| if b { "true" } else { "false" }.to_string()),
                TypeTarget::Numeric => trimmed.parse::<f64>().ok().map(|_| trimmed.to_string()),
                TypeTarget::Datetime => {
                    parse_date(trimmed).map(|d| d.format("%Y-%m-%d").to_string())
                }
            };
            // Non-convertible values become missing rather than aborting.
            let new_value = converted.unwrap_or_default();
            (new_value != value).then_some(new_value)
        })
    }

    fn clip_outliers(
        &self,
        table: &mut DataTable,
        columns: &[String],
        method: OutlierMethod,
        threshold: f64,
    ) -> usize {
        let mut clipped = 0;
        for column in columns {
            let Some(col) = table.column_index(column) else {
                continue;
            };
            let summary = NumericSummary::from_values(
                table
                    .column_values(col)
                    .filter_map(|v| v.trim().parse::<f64>().ok())
                    .filter(|v| v.is_finite()),
            );
            let Some(summary) = summary else {
                continue;
            };

            let (lower, upper) = match method {
                OutlierMethod::Iqr => summary.iqr_fences(threshold),
                OutlierMethod::ZScore => (
                    summary.mean - threshold * summary.std,
                    summary.mean + threshold * summary.std,
                ),
            };

            clipped += self.rewrite_cells(
                table,
                std::slice::from_ref(column),
                move |value| {
                    let parsed = value.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
                    let clamped = parsed.clamp(lower, upper);
                    (clamped != parsed).then(|| format_number(clamped))
                },
            );
        }
        clipped
    }
}

impl Default for TransformEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Median of the parseable values of a column.
fn column_median(table: &DataTable, col: usize) -> Option<f64> {
    let mut values: Vec<f64> = table
        .column_values(col)
        .filter_map(|v| v.trim().parse::<f64>().ok())
        .collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    })
}

/// Most frequent non-missing value; ties break to the lexicographically
/// smallest for determinism.
fn column_mode(table: &DataTable, col: usize) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in table.column_values(col) {
        if !DataTable::is_missing(value) {
            *counts.entry(value).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .max_by(|(va, ca), (vb, cb)| ca.cmp(cb).then(vb.cmp(va)))
        .map(|(value, _)| value.to_string())
}

fn convert_case(value: &str, style: CaseStyle) -> String {
    match style {
        CaseStyle::Lower => value.to_lowercase(),
        CaseStyle::Upper => value.to_uppercase(),
        CaseStyle::Title => title_case(value),
    }
}

/// Uppercase the first letter of each word, lowercase the rest, preserving
/// non-alphabetic characters and spacing.
fn title_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut at_word_start = true;
    for ch in value.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                result.extend(ch.to_uppercase());
            } else {
                result.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            result.push(ch);
            at_word_start = true;
        }
    }
    result
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

/// Use the requested strftime format if it parses, ISO otherwise. A bad
/// format string must not panic mid-transformation.
fn validated_format(format: &str) -> &str {
    let valid = !StrftimeItems::new(format).any(|item| matches!(item, Item::Error));
    if valid {
        format
    } else {
        "%Y-%m-%d"
    }
}

/// Format a float without a trailing `.0` for whole numbers.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
