//! Strict, quote-aware CSV validation for upload-time diagnostics.
//!
//! Unlike [`super::io::parse_delimited`], this path understands quoted fields,
//! CRLF line endings and alternative delimiters, and it never fails: every
//! problem is reported as a [`ParseIssue`] in the returned
//! [`ValidationReport`], split into blocking errors and advisory warnings.

use super::types::{Row, Table};
use crate::utils::parse_number;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// Share of rows that may violate a column's inferred type before warning.
const ROW_MISMATCH_TOLERANCE: f64 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    EmptyFile,
    MissingHeader,
    TooManyColumns,
    ParseError,
    InconsistentColumns,
    SchemaMismatch,
    DatatypeMismatch,
    ExcessiveMissing,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParseIssue {
    pub code: IssueCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
}

impl ParseIssue {
    fn new(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            detail: None,
        }
    }

    fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = Some(detail);
        self
    }
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InferredType {
    Number,
    Boolean,
    Date,
    String,
    Unknown,
}

impl InferredType {
    fn accepts(self, value: &str) -> bool {
        match self {
            Self::Number => looks_numeric(value),
            Self::Boolean => looks_boolean(value),
            Self::Date => looks_like_date(value),
            Self::String | Self::Unknown => true,
        }
    }
}

/// Columns and types an upload is expected to have.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpectedSchema {
    /// Required column names (order-insensitive)
    #[serde(default)]
    pub columns: Vec<String>,

    /// Expected type by column name
    #[serde(default)]
    pub types: BTreeMap<String, InferredType>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrictOptions {
    pub delimiter: char,
    /// Hard cap on header width, `None` for no cap
    pub max_columns: Option<usize>,
    pub require_header: bool,
    /// Missing ratio in `[0, 1]` considered excessive
    pub missing_threshold: f64,
    /// Number of leading rows used for type inference
    pub sample_rows_for_types: usize,
    pub expected_schema: Option<ExpectedSchema>,
}

impl Default for StrictOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            max_columns: Some(100),
            require_header: true,
            missing_threshold: 0.5,
            sample_rows_for_types: 100,
            expected_schema: None,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ValidationReport {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub errors: Vec<ParseIssue>,
    pub warnings: Vec<ParseIssue>,
    pub column_types: HashMap<String, InferredType>,
    pub missing_ratio_by_column: HashMap<String, f64>,
}

impl ValidationReport {
    fn failed(issue: ParseIssue) -> Self {
        Self {
            errors: vec![issue],
            ..Default::default()
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_issue(&self, code: IssueCode) -> bool {
        self.errors
            .iter()
            .chain(&self.warnings)
            .any(|issue| issue.code == code)
    }

    pub fn into_table(self) -> Table {
        Table::new(self.columns, self.rows)
    }
}

/// Validates delimited text against `options`.
///
/// Bare blank lines are skipped by the reader. In a single-column file an
/// explicit empty field (`""`) still counts as a row with a missing cell.
pub fn validate_delimited(text: &str, options: &StrictOptions) -> ValidationReport {
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    if text.trim().is_empty() {
        return ValidationReport::failed(empty_file());
    }

    let records = match read_records(text, options.delimiter) {
        Ok(records) => records,
        Err(issue) => return ValidationReport::failed(issue),
    };

    let Some((header_record, data_records)) = records.split_first() else {
        return ValidationReport::failed(empty_file());
    };
    if matches!(header_record.as_slice(), [only] if only.is_empty()) {
        return ValidationReport::failed(empty_file());
    }

    let mut report = ValidationReport::default();
    let header: Vec<String> = header_record.iter().map(|h| h.trim().to_owned()).collect();
    check_header(&header, options, &mut report);

    let column_count = header.len();
    if let Some(pos) = data_records.iter().position(|r| r.len() != column_count) {
        // header is row 1, so the first data record is row 2
        let row_number = pos + 2;
        report.errors.push(
            ParseIssue::new(
                IssueCode::InconsistentColumns,
                format!("Row {row_number} does not have the same number of columns as the header"),
            )
            .with_detail(json!({ "row": row_number })),
        );
    }

    let keys: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if h.is_empty() {
                format!("column_{}", i + 1)
            } else {
                h.clone()
            }
        })
        .collect();

    report.rows = data_records
        .iter()
        .map(|record| {
            keys.iter()
                .enumerate()
                .map(|(c, key)| (key.clone(), record.get(c).cloned().unwrap_or_default()))
                .collect()
        })
        .collect();

    infer_types(&keys, options, &mut report);
    check_missing(&keys, options, &mut report);
    check_schema(&keys, options, &mut report);
    check_row_types(&keys, &mut report);

    report.columns = keys;
    report
}

fn empty_file() -> ParseIssue {
    ParseIssue::new(IssueCode::EmptyFile, "The file is empty")
}

fn read_records(text: &str, delimiter: char) -> Result<Vec<Vec<String>>, ParseIssue> {
    let delimiter = u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| {
            ParseIssue::new(
                IssueCode::ParseError,
                format!("Unsupported delimiter {delimiter:?}"),
            )
        })?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records: Vec<Vec<String>> = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| {
            ParseIssue::new(
                IssueCode::ParseError,
                format!("An error occurred while parsing the CSV: {e}"),
            )
        })?;
        let fields: Vec<String> = record.iter().map(str::to_owned).collect();
        // a lone empty field is a missing cell when the header has one column
        let single_column = records.first().is_some_and(|h| h.len() == 1);
        if !single_column && matches!(fields.as_slice(), [only] if only.is_empty()) {
            continue;
        }
        records.push(fields);
    }
    Ok(records)
}

fn check_header(header: &[String], options: &StrictOptions, report: &mut ValidationReport) {
    let named: Vec<&String> = header.iter().filter(|h| !h.is_empty()).collect();
    let distinct: HashSet<&&String> = named.iter().collect();
    let has_duplicates = distinct.len() != named.len();

    if options.require_header && (named.is_empty() || has_duplicates) {
        let message = if has_duplicates {
            "The header contains duplicate column names"
        } else {
            "The header is missing or empty"
        };
        report
            .errors
            .push(ParseIssue::new(IssueCode::MissingHeader, message));
    }

    if let Some(max) = options.max_columns
        && max > 0
        && header.len() > max
    {
        report.errors.push(
            ParseIssue::new(
                IssueCode::TooManyColumns,
                format!("Column count exceeds the limit ({max})"),
            )
            .with_detail(json!({ "columnCount": header.len() })),
        );
    }
}

fn trimmed<'a>(row: &'a Row, key: &str) -> &'a str {
    row.get(key).map(|v| v.trim()).unwrap_or_default()
}

fn classify(value: &str) -> InferredType {
    if looks_numeric(value) {
        InferredType::Number
    } else if looks_boolean(value) {
        InferredType::Boolean
    } else if looks_like_date(value) {
        InferredType::Date
    } else {
        InferredType::String
    }
}

fn infer_types(keys: &[String], options: &StrictOptions, report: &mut ValidationReport) {
    let sample = report.rows.len().min(options.sample_rows_for_types);

    for key in keys {
        // tie order: number, boolean, date, string
        let mut counts = [
            (InferredType::Number, 0_usize),
            (InferredType::Boolean, 0),
            (InferredType::Date, 0),
            (InferredType::String, 0),
        ];
        for row in report.rows.iter().take(sample) {
            let value = trimmed(row, key);
            if value.is_empty() {
                continue;
            }
            let kind = classify(value);
            if let Some(slot) = counts.iter_mut().find(|(k, _)| *k == kind) {
                slot.1 += 1;
            }
        }

        let mut best = (InferredType::Unknown, 0);
        for (kind, count) in counts {
            if count > best.1 {
                best = (kind, count);
            }
        }
        report.column_types.insert(key.clone(), best.0);
    }
}

fn check_missing(keys: &[String], options: &StrictOptions, report: &mut ValidationReport) {
    let total = report.rows.len();
    for key in keys {
        let missing = report
            .rows
            .iter()
            .filter(|row| {
                let v = trimmed(row, key);
                v.is_empty() || v.eq_ignore_ascii_case("na") || v.eq_ignore_ascii_case("null")
            })
            .count();
        let ratio = if total == 0 {
            0.0
        } else {
            missing as f64 / total as f64
        };
        report.missing_ratio_by_column.insert(key.clone(), ratio);

        if ratio >= options.missing_threshold {
            report.warnings.push(
                ParseIssue::new(
                    IssueCode::ExcessiveMissing,
                    format!(
                        "Column \"{key}\" has a high missing-value ratio ({}%)",
                        (ratio * 100.0).round()
                    ),
                )
                .with_detail(json!({ "column": key, "ratio": ratio })),
            );
        }
    }
}

fn check_schema(keys: &[String], options: &StrictOptions, report: &mut ValidationReport) {
    let Some(schema) = &options.expected_schema else {
        return;
    };

    if !schema.columns.is_empty() {
        let missing: Vec<&String> = schema
            .columns
            .iter()
            .filter(|c| !keys.contains(c))
            .collect();
        let extra: Vec<&String> = keys
            .iter()
            .filter(|k| !schema.columns.contains(k))
            .collect();
        if !missing.is_empty() || !extra.is_empty() {
            report.errors.push(
                ParseIssue::new(
                    IssueCode::SchemaMismatch,
                    "The schema does not match (column set differs)",
                )
                .with_detail(json!({ "missing": missing, "extra": extra })),
            );
        }
    }

    let mismatches: Vec<serde_json::Value> = schema
        .types
        .iter()
        .filter_map(|(column, expected)| {
            let actual = report
                .column_types
                .get(column)
                .copied()
                .unwrap_or(InferredType::Unknown);
            (actual != InferredType::Unknown && actual != *expected).then(|| {
                json!({ "column": column, "expected": expected, "actual": actual })
            })
        })
        .collect();
    if !mismatches.is_empty() {
        report.warnings.push(
            ParseIssue::new(
                IssueCode::DatatypeMismatch,
                "Some columns have a different data type than expected",
            )
            .with_detail(serde_json::Value::Array(mismatches)),
        );
    }
}

fn check_row_types(keys: &[String], report: &mut ValidationReport) {
    let total = report.rows.len();
    if total == 0 {
        return;
    }

    let mut flagged = Vec::new();
    for key in keys {
        let inferred = report
            .column_types
            .get(key)
            .copied()
            .unwrap_or(InferredType::Unknown);
        if inferred == InferredType::Unknown {
            continue;
        }
        let violations = report
            .rows
            .iter()
            .map(|row| trimmed(row, key))
            .filter(|v| !v.is_empty() && !inferred.accepts(v))
            .count();
        let ratio = violations as f64 / total as f64;
        if ratio > ROW_MISMATCH_TOLERANCE {
            flagged.push(json!({ "column": key, "mismatchRatio": ratio }));
        }
    }

    if !flagged.is_empty() {
        report.warnings.push(
            ParseIssue::new(
                IssueCode::DatatypeMismatch,
                "Data type mismatches were detected in some rows",
            )
            .with_detail(serde_json::Value::Array(flagged)),
        );
    }
}

/// Thousands separators are ignored: `1,200` is numeric.
pub fn looks_numeric(value: &str) -> bool {
    let stripped = value.replace(',', "");
    !stripped.trim().is_empty() && parse_number(&stripped).is_some()
}

pub fn looks_boolean(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "true" | "false" | "0" | "1" | "yes" | "no"
    )
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

pub fn looks_like_date(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || DateTime::parse_from_rfc2822(value).is_ok()
        || DATETIME_FORMATS
            .iter()
            .any(|fmt| NaiveDateTime::parse_from_str(value, fmt).is_ok())
        || DATE_FORMATS
            .iter()
            .any(|fmt| NaiveDate::parse_from_str(value, fmt).is_ok())
}
