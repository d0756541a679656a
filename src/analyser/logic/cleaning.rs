//! Table mutations.
//!
//! Every operation is a total function from the current table (and the
//! column info derived from it) to a new table. Cells that an operation cannot
//! handle are left alone rather than reported. Callers decide up front whether
//! an operation makes sense at all with [`is_applicable`].

use super::profiling::{analyze_table, quantile_at, sorted_values};
use super::types::{ColumnInfo, ColumnType, FillMethod, Operation, Table, find_info, is_missing};
use crate::utils::{format_fixed, format_number, parse_number};
use std::collections::HashMap;

/// Decimal places written by the scaling operations.
pub const SCALED_DECIMALS: usize = 4;

/// Fence multiplier applied to the interquartile range.
pub const IQR_FACTOR: f64 = 1.5;

/// Applies `op` and re-derives the column info from the result.
pub fn apply_operation(
    table: &Table,
    info: &[ColumnInfo],
    op: &Operation,
) -> (Table, Vec<ColumnInfo>) {
    let next = transform(table, info, op);
    let next_info = analyze_table(&next);

    tracing::debug!(
        operation = %op.label(),
        rows_before = table.row_count(),
        rows_after = next.row_count(),
        "Applied operation"
    );
    (next, next_info)
}

/// Applies `op` to the table only.
pub fn transform(table: &Table, info: &[ColumnInfo], op: &Operation) -> Table {
    match op {
        Operation::Standardize { columns } => standardize(table, info, columns),
        Operation::Normalize { columns } => normalize(table, info, columns),
        Operation::FillMissing {
            column,
            method,
            value,
        } => fill_missing(table, info, column, *method, value.as_deref()),
        Operation::RemoveOutliers { column } => remove_outliers(table, column),
        Operation::ChangeType { column, to } => change_type(table, column, *to),
        Operation::DeleteColumn { column } => delete_column(table, column),
    }
}

/// Whether `op` would do anything meaningful on this table.
///
/// Scaling needs a non-empty selection, outlier removal a numeric column, and
/// the single-column operations a column that exists.
pub fn is_applicable(table: &Table, info: &[ColumnInfo], op: &Operation) -> bool {
    match op {
        Operation::Standardize { columns } | Operation::Normalize { columns } => {
            !columns.is_empty()
        }
        Operation::FillMissing { column, .. } => find_info(info, column).is_some(),
        Operation::RemoveOutliers { column } => {
            find_info(info, column).is_some_and(ColumnInfo::is_numeric)
        }
        Operation::ChangeType { column, .. } | Operation::DeleteColumn { column } => {
            table.has_column(column)
        }
    }
}

/// Rewrites every parseable cell of the selected columns through `scale`.
fn rescale(table: &Table, scalers: &[(&str, Box<dyn Fn(f64) -> String>)]) -> Table {
    let rows = table
        .rows
        .iter()
        .map(|row| {
            let mut next = row.clone();
            for (column, scale) in scalers {
                if let Some(v) = row.get(*column).and_then(|c| parse_number(c)) {
                    next.insert((*column).to_owned(), scale(v));
                }
            }
            next
        })
        .collect();
    Table::new(table.columns.clone(), rows)
}

fn numeric_info<'a>(info: &'a [ColumnInfo], column: &str) -> Option<&'a ColumnInfo> {
    find_info(info, column).filter(|c| c.is_numeric())
}

/// Z-score scaling `(v - mean) / std` with 4 decimals.
///
/// Uses the recorded (rounded) mean and std. Columns that are not numeric or
/// whose std rounds to `0.00` are skipped, so a tiny real spread such as
/// `1.001, 1.004` leaves the column unchanged.
pub fn standardize(table: &Table, info: &[ColumnInfo], columns: &[String]) -> Table {
    let scalers: Vec<(&str, Box<dyn Fn(f64) -> String>)> = columns
        .iter()
        .filter_map(|column| {
            let col = numeric_info(info, column)?;
            let (mean, std) = (col.mean?, col.std?);
            if std == 0.0 {
                tracing::debug!(column = %column, "Skipping standardization of constant column");
                return None;
            }
            let scale: Box<dyn Fn(f64) -> String> =
                Box::new(move |v: f64| format_fixed((v - mean) / std, SCALED_DECIMALS));
            Some((column.as_str(), scale))
        })
        .collect();
    rescale(table, &scalers)
}

/// Min-max scaling `(v - min) / (max - min)` with 4 decimals.
///
/// A zero range writes the literal `0` into every parseable cell.
pub fn normalize(table: &Table, info: &[ColumnInfo], columns: &[String]) -> Table {
    let scalers: Vec<(&str, Box<dyn Fn(f64) -> String>)> = columns
        .iter()
        .filter_map(|column| {
            let col = numeric_info(info, column)?;
            let (min, max) = (col.min?, col.max?);
            let range = max - min;
            let scale: Box<dyn Fn(f64) -> String> = if range == 0.0 {
                Box::new(|_: f64| "0".to_owned())
            } else {
                Box::new(move |v: f64| format_fixed((v - min) / range, SCALED_DECIMALS))
            };
            Some((column.as_str(), scale))
        })
        .collect();
    rescale(table, &scalers)
}

/// Replaces missing cells of `column`; present cells are never touched.
///
/// When the requested source has nothing to offer (non-numeric column for
/// mean/median, no values for mode, no custom value) the cells stay empty.
pub fn fill_missing(
    table: &Table,
    info: &[ColumnInfo],
    column: &str,
    method: FillMethod,
    custom: Option<&str>,
) -> Table {
    let col = find_info(info, column);
    let fill = match method {
        FillMethod::Mean => col.and_then(|c| c.mean).map(format_number),
        FillMethod::Median => col.and_then(|c| c.median).map(format_number),
        FillMethod::Mode => mode_of(table, column),
        FillMethod::Custom => custom.filter(|v| !v.is_empty()).map(str::to_owned),
    }
    .unwrap_or_default();

    let rows = table
        .rows
        .iter()
        .map(|row| {
            if is_missing(row.get(column).map(String::as_str)) {
                let mut next = row.clone();
                next.insert(column.to_owned(), fill.clone());
                next
            } else {
                row.clone()
            }
        })
        .collect();
    Table::new(table.columns.clone(), rows)
}

/// Most frequent non-missing value; ties go to the value seen first.
pub fn mode_of(table: &Table, column: &str) -> Option<String> {
    let mut order: Vec<(&str, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for cell in table.column_cells(column).flatten() {
        if cell.is_empty() {
            continue;
        }
        match index.get(cell) {
            Some(&i) => {
                if let Some(slot) = order.get_mut(i) {
                    slot.1 += 1;
                }
            }
            None => {
                index.insert(cell, order.len());
                order.push((cell, 1));
            }
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (value, count) in order {
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value.to_owned())
}

/// IQR fences `[Q1 - 1.5 IQR, Q3 + 1.5 IQR]` over the parseable cells.
pub fn outlier_bounds(table: &Table, column: &str) -> Option<(f64, f64)> {
    let values: Vec<f64> = table
        .column_cells(column)
        .flatten()
        .filter_map(parse_number)
        .collect();
    let sorted = sorted_values(&values);
    let q1 = quantile_at(&sorted, 0.25)?;
    let q3 = quantile_at(&sorted, 0.75)?;
    let iqr = q3 - q1;
    Some((q1 - IQR_FACTOR * iqr, q3 + IQR_FACTOR * iqr))
}

/// Drops whole rows whose `column` value lies outside the IQR fences.
/// Rows whose value does not parse are kept.
pub fn remove_outliers(table: &Table, column: &str) -> Table {
    let Some((lower, upper)) = outlier_bounds(table, column) else {
        return table.clone();
    };

    let rows = table
        .rows
        .iter()
        .filter(|row| {
            row.get(column)
                .and_then(|c| parse_number(c))
                .is_none_or(|v| v >= lower && v <= upper)
        })
        .cloned()
        .collect();
    Table::new(table.columns.clone(), rows)
}

/// Casts every cell of `column`.
///
/// `number` rewrites each cell from its parsed value (empty when it does not
/// parse); `string` keeps the text and materializes absent cells as empty.
pub fn change_type(table: &Table, column: &str, to: ColumnType) -> Table {
    let rows = table
        .rows
        .iter()
        .map(|row| {
            let cell = row.get(column);
            let value = match to {
                ColumnType::Number => cell
                    .and_then(|c| parse_number(c))
                    .map(format_number)
                    .unwrap_or_default(),
                ColumnType::String => cell.cloned().unwrap_or_default(),
            };
            let mut next = row.clone();
            next.insert(column.to_owned(), value);
            next
        })
        .collect();
    Table::new(table.columns.clone(), rows)
}

/// Removes `column` from the header and from every row.
pub fn delete_column(table: &Table, column: &str) -> Table {
    let columns = table
        .columns
        .iter()
        .filter(|c| c.as_str() != column)
        .cloned()
        .collect();
    let rows = table
        .rows
        .iter()
        .map(|row| {
            let mut next = row.clone();
            next.remove(column);
            next
        })
        .collect();
    Table::new(columns, rows)
}
