//! Column type inference and descriptive statistics.
//!
//! A column is `number` when more than 80% of its non-missing cells parse as
//! floats. Numeric columns carry mean, median, min, max and population std.
//! Mean and std are rounded to 2 decimals; the median is the upper median
//! (`sorted[n / 2]`), not the average of the two middle values.
//!
//! Everything here is a pure function of its input: the engine re-runs
//! [`analyze_columns`] after every mutation instead of patching old results.

use super::types::{ColumnInfo, ColumnType, Row, Table, is_missing};
use crate::utils::{parse_number, round_to};
use std::collections::HashSet;

/// Share of non-missing cells that must parse for a column to count as numeric.
pub const NUMERIC_THRESHOLD: f64 = 0.8;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NumericSummary {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub std: f64,
}

pub fn analyze_table(table: &Table) -> Vec<ColumnInfo> {
    analyze_columns(&table.columns, &table.rows)
}

pub fn analyze_columns(columns: &[String], rows: &[Row]) -> Vec<ColumnInfo> {
    columns
        .iter()
        .map(|name| analyze_column(name, rows))
        .collect()
}

pub fn analyze_column(name: &str, rows: &[Row]) -> ColumnInfo {
    let values: Vec<&str> = rows
        .iter()
        .map(|r| r.get(name).map(String::as_str))
        .filter(|cell| !is_missing(*cell))
        .flatten()
        .collect();

    let numeric: Vec<f64> = values.iter().filter_map(|v| parse_number(v)).collect();
    let is_numeric = numeric.len() as f64 > values.len() as f64 * NUMERIC_THRESHOLD;

    let missing = rows.len() - values.len();
    let unique = values.iter().collect::<HashSet<_>>().len();

    let kind = if is_numeric {
        ColumnType::Number
    } else {
        ColumnType::String
    };
    let mut info = ColumnInfo::base(name, kind, missing, unique);

    if is_numeric && let Some(summary) = summarize(&numeric) {
        info.mean = Some(round_to(summary.mean, 2));
        info.median = Some(summary.median);
        info.min = Some(summary.min);
        info.max = Some(summary.max);
        info.std = Some(round_to(summary.std, 2));
    }

    info
}

/// Unrounded statistics over `values`; `None` for an empty slice.
pub fn summarize(values: &[f64]) -> Option<NumericSummary> {
    if values.is_empty() {
        return None;
    }

    let sorted = sorted_values(values);
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let median = *sorted.get(sorted.len() / 2)?;
    let min = *sorted.first()?;
    let max = *sorted.last()?;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    Some(NumericSummary {
        mean,
        median,
        min,
        max,
        std: variance.sqrt(),
    })
}

/// Ascending copy. Inputs are finite so `total_cmp` agrees with `<`.
pub fn sorted_values(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Value at `floor(len * fraction)` of an ascending slice.
pub fn quantile_at(sorted: &[f64], fraction: f64) -> Option<f64> {
    let idx = (sorted.len() as f64 * fraction).floor() as usize;
    sorted.get(idx).copied()
}
