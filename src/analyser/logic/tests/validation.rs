use super::{SMALL, table};
use crate::analyser::logic::*;
use std::collections::BTreeMap;

fn strict(text: &str) -> ValidationReport {
    validate_delimited(text, &StrictOptions::default())
}

fn codes(issues: &[ParseIssue]) -> Vec<IssueCode> {
    issues.iter().map(|i| i.code).collect()
}

#[test]
fn test_clean_file() {
    let report = strict("name,qty,date\nbolt,10,2024-01-02\nnut,20,2024-01-03");

    assert!(report.is_valid());
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert_eq!(report.rows.len(), 2);
    assert_eq!(report.column_types["name"], InferredType::String);
    assert_eq!(report.column_types["qty"], InferredType::Number);
    assert_eq!(report.column_types["date"], InferredType::Date);
    assert_eq!(report.missing_ratio_by_column["qty"], 0.0);
}

#[test]
fn test_quoted_fields_and_crlf() {
    let report = strict("a,b\r\n\"x,y\",2\r\n\"line\r\nbreak\",3\r\n");

    assert!(report.is_valid());
    assert_eq!(report.rows.len(), 2);
    assert_eq!(report.rows[0]["a"], "x,y");
    assert_eq!(report.rows[1]["a"], "line\r\nbreak");
}

#[test]
fn test_alternative_delimiter() {
    let options = StrictOptions {
        delimiter: ';',
        ..Default::default()
    };
    let report = validate_delimited("a;b\n1;2", &options);
    assert_eq!(report.columns, vec!["a".to_owned(), "b".to_owned()]);
    assert_eq!(report.rows[0]["b"], "2");
}

#[test]
fn test_empty_file() {
    for text in ["", "\n\n", "\u{FEFF}  \n"] {
        let report = strict(text);
        assert_eq!(codes(&report.errors), vec![IssueCode::EmptyFile], "input {text:?}");
        assert!(report.rows.is_empty());
    }
}

#[test]
fn test_inconsistent_columns() {
    let report = strict("a,b\n1,2\n3");

    assert!(!report.is_valid());
    assert_eq!(codes(&report.errors), vec![IssueCode::InconsistentColumns]);
    assert_eq!(
        report.errors[0].message,
        "Row 3 does not have the same number of columns as the header"
    );
    assert_eq!(report.rows[1]["b"], "", "short rows are still padded");
}

#[test]
fn test_duplicate_header() {
    let report = strict("a,a\n1,2");
    assert_eq!(codes(&report.errors), vec![IssueCode::MissingHeader]);

    let relaxed = StrictOptions {
        require_header: false,
        ..Default::default()
    };
    assert!(validate_delimited("a,a\n1,2", &relaxed).is_valid());
}

#[test]
fn test_unnamed_columns_get_positional_keys() {
    let report = strict(",b\n1,2");
    assert!(report.is_valid());
    assert_eq!(report.columns, vec!["column_1".to_owned(), "b".to_owned()]);
    assert_eq!(report.rows[0]["column_1"], "1");
}

#[test]
fn test_too_many_columns() {
    let options = StrictOptions {
        max_columns: Some(2),
        ..Default::default()
    };
    let report = validate_delimited("a,b,c\n1,2,3", &options);
    assert!(report.has_issue(IssueCode::TooManyColumns));

    let unlimited = StrictOptions {
        max_columns: None,
        ..Default::default()
    };
    assert!(validate_delimited("a,b,c\n1,2,3", &unlimited).is_valid());
}

#[test]
fn test_excessive_missing_is_a_warning() {
    let report = strict("a,b\n1,\n2,NA\n3,x");

    assert!(report.is_valid());
    assert_eq!(codes(&report.warnings), vec![IssueCode::ExcessiveMissing]);
    let ratio = report.missing_ratio_by_column["b"];
    assert!((ratio - 2.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_single_column_empty_field_is_missing() {
    let report = strict("v\n10\n\"\"\n\"\"\n30");

    assert!(report.is_valid(), "{:?}", report.errors);
    assert_eq!(report.rows.len(), 4);
    assert_eq!(report.rows[1]["v"], "");
    let ratio = report.missing_ratio_by_column["v"];
    assert!((ratio - 0.5).abs() < 1e-9);
    assert_eq!(codes(&report.warnings), vec![IssueCode::ExcessiveMissing]);
}

#[test]
fn test_expected_schema() {
    let options = StrictOptions {
        expected_schema: Some(ExpectedSchema {
            columns: vec!["a".to_owned(), "c".to_owned()],
            types: BTreeMap::from([("a".to_owned(), InferredType::Date)]),
        }),
        ..Default::default()
    };
    let report = validate_delimited("a,b\n1,2\n3,4", &options);

    assert_eq!(codes(&report.errors), vec![IssueCode::SchemaMismatch]);
    assert_eq!(codes(&report.warnings), vec![IssueCode::DatatypeMismatch]);
}

#[test]
fn test_row_type_violations() {
    let report = strict("v\n1\n2\n3\nx");

    assert_eq!(report.column_types["v"], InferredType::Number);
    assert!(report.has_issue(IssueCode::DatatypeMismatch));
    assert!(report.is_valid(), "type drift only warns");
}

#[test]
fn test_header_only_file() {
    let report = strict("a,b");
    assert!(report.is_valid());
    assert!(report.rows.is_empty());
    assert_eq!(report.column_types["a"], InferredType::Unknown);
}

#[test]
fn test_report_into_table_matches_lenient_parse() {
    let report = strict(SMALL);
    assert!(report.is_valid());
    assert_eq!(report.into_table(), table(SMALL));
}
