use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One table row keyed by column name. An empty string is a missing cell.
pub type Row = HashMap<String, String>;

/// Rectangular string table: header order in `columns`, one mapping per row.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Cell text at `(row, column)`; `None` when the row or key is absent.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
    }

    /// Cells of one column in row order, `None` for absent keys.
    pub fn column_cells<'a>(&'a self, column: &'a str) -> impl Iterator<Item = Option<&'a str>> {
        self.rows
            .iter()
            .map(move |r| r.get(column).map(String::as_str))
    }
}

/// Missing means absent or empty. Whitespace-only text is a value.
pub fn is_missing(cell: Option<&str>) -> bool {
    cell.is_none_or(str::is_empty)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Number,
    #[default]
    String,
}

impl ColumnType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::String => "string",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Per-column metadata, always derived from the table it describes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ColumnType,
    pub missing: usize,
    pub unique: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std: Option<f64>,
}

impl ColumnInfo {
    pub fn base(name: impl Into<String>, kind: ColumnType, missing: usize, unique: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            missing,
            unique,
            mean: None,
            median: None,
            min: None,
            max: None,
            std: None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.kind == ColumnType::Number
    }

    pub fn has_stats(&self) -> bool {
        self.mean.is_some()
    }

    pub fn missing_pct(&self, row_count: usize) -> f64 {
        if row_count == 0 {
            0.0
        } else {
            (self.missing as f64 / row_count as f64) * 100.0
        }
    }
}

/// Looks up the info entry for `name`.
pub fn find_info<'a>(info: &'a [ColumnInfo], name: &str) -> Option<&'a ColumnInfo> {
    info.iter().find(|c| c.name == name)
}

/// Source of the replacement value for missing cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillMethod {
    Mean,
    Median,
    Mode,
    Custom,
}

impl FillMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Mode => "mode",
            Self::Custom => "custom",
        }
    }
}

/// A single table mutation (tagged enum, stored as-is in recipes).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Z-score scaling with the column's recorded mean and std
    Standardize { columns: Vec<String> },

    /// Min-max scaling into [0, 1]
    Normalize { columns: Vec<String> },

    /// Replace missing cells of one column
    FillMissing {
        column: String,
        method: FillMethod,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },

    /// Drop rows outside the IQR fences of one numeric column
    RemoveOutliers { column: String },

    /// Cast every cell of a column
    ChangeType { column: String, to: ColumnType },

    /// Remove a column from the table
    DeleteColumn { column: String },
}

impl Operation {
    /// Short human-readable description, used for snapshot labels.
    pub fn label(&self) -> String {
        match self {
            Self::Standardize { columns } => format!("Standardize {}", columns.join(", ")),
            Self::Normalize { columns } => format!("Normalize {}", columns.join(", ")),
            Self::FillMissing { column, method, .. } => {
                format!("Fill missing in {column} ({})", method.as_str())
            }
            Self::RemoveOutliers { column } => format!("Remove outliers in {column}"),
            Self::ChangeType { column, to } => format!("Change {column} to {to}"),
            Self::DeleteColumn { column } => format!("Delete column {column}"),
        }
    }

    /// Every column name the operation reads or writes.
    pub fn referenced_columns(&self) -> Vec<&str> {
        match self {
            Self::Standardize { columns } | Self::Normalize { columns } => {
                columns.iter().map(String::as_str).collect()
            }
            Self::FillMissing { column, .. }
            | Self::RemoveOutliers { column }
            | Self::ChangeType { column, .. }
            | Self::DeleteColumn { column } => vec![column.as_str()],
        }
    }
}

/// Which decoder a file goes through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Spreadsheet,
}

impl FileKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xls" | "xlsm" | "ods" => Some(Self::Spreadsheet),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        Self::from_extension(ext)
    }
}

/// One immutable history entry.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub table: Table,
    pub column_info: Vec<ColumnInfo>,
    pub label: String,
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(table: Table, column_info: Vec<ColumnInfo>, label: impl Into<String>) -> Self {
        Self {
            table,
            column_info,
            label: label.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kind_from_name() {
        assert_eq!(FileKind::from_name("plant.CSV"), Some(FileKind::Csv));
        assert_eq!(FileKind::from_name("line.xlsx"), Some(FileKind::Spreadsheet));
        assert_eq!(FileKind::from_name("old.xls"), Some(FileKind::Spreadsheet));
        assert_eq!(FileKind::from_name("notes.txt"), None);
        assert_eq!(FileKind::from_name("no_extension"), None);
    }

    #[test]
    fn test_operation_json_shape() {
        let op = Operation::FillMissing {
            column: "temp".to_owned(),
            method: FillMethod::Custom,
            value: Some("0".to_owned()),
        };
        let json = serde_json::to_value(&op).expect("serialize");
        assert_eq!(json["op"], "fill_missing");
        assert_eq!(json["method"], "custom");
        assert_eq!(json["value"], "0");

        let parsed: Operation =
            serde_json::from_str(r#"{"op":"change_type","column":"qty","to":"number"}"#)
                .expect("deserialize");
        assert_eq!(
            parsed,
            Operation::ChangeType {
                column: "qty".to_owned(),
                to: ColumnType::Number
            }
        );
    }

    #[test]
    fn test_column_info_serializes_type_field() {
        let info = ColumnInfo::base("line", ColumnType::String, 2, 5);
        let json = serde_json::to_value(&info).expect("serialize");
        assert_eq!(json["type"], "string");
        assert!(json.get("mean").is_none(), "absent stats are omitted");
    }

    #[test]
    fn test_is_missing() {
        assert!(is_missing(None));
        assert!(is_missing(Some("")));
        assert!(!is_missing(Some(" ")));
        assert!(!is_missing(Some("0")));
    }

    #[test]
    fn test_operation_label() {
        let op = Operation::Standardize {
            columns: vec!["a".to_owned(), "b".to_owned()],
        };
        assert_eq!(op.label(), "Standardize a, b");
        assert_eq!(op.referenced_columns(), vec!["a", "b"]);
    }
}
