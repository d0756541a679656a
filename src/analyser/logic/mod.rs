//! Pure table logic: parsing, profiling, validation and mutations.
//!
//! Nothing in here holds state; [`super::session`] wires these functions to
//! the undo history.

pub mod cleaning;
pub mod io;
pub mod profiling;
pub mod types;
pub mod validation;

pub use cleaning::{apply_operation, is_applicable, transform};
pub use io::{
    export_file_name, load_bytes, load_path, parse_delimited, parse_spreadsheet, save_csv,
    write_csv,
};
pub use profiling::{analyze_column, analyze_columns, analyze_table};
pub use types::{
    ColumnInfo, ColumnType, FileKind, FillMethod, Operation, Row, Snapshot, Table, find_info,
    is_missing,
};
pub use validation::{
    ExpectedSchema, InferredType, IssueCode, ParseIssue, StrictOptions, ValidationReport,
    validate_delimited,
};
