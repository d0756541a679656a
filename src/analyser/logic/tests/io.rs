use super::{SMALL, cells, info_for, table};
use crate::analyser::logic::io::cell_to_string;
use crate::analyser::logic::*;
use crate::error::PrepError;
use calamine::Data;

#[test]
fn test_parse_small_table() {
    let t = table(SMALL);
    assert_eq!(t.columns, vec!["a".to_owned(), "b".to_owned()]);
    assert_eq!(t.row_count(), 3);
    assert_eq!(t.cell(1, "b"), Some(""), "empty trailing field is a missing cell");
}

#[test]
fn test_bom_and_crlf() {
    let t = table("\u{FEFF}x,y\r\n1,2\r\n3,4\r\n");
    assert_eq!(t.columns, vec!["x".to_owned(), "y".to_owned()]);
    assert_eq!(cells(&t, "y"), vec!["2", "4"], "carriage returns are trimmed");
}

#[test]
fn test_blank_lines_and_ragged_rows() {
    let t = table("a,b,c\n\n1\n   \n4,5,6,7\n");
    assert_eq!(t.row_count(), 2, "blank and whitespace-only lines are skipped");
    assert_eq!(t.cell(0, "b"), Some(""), "short rows are padded");
    assert_eq!(t.cell(0, "c"), Some(""));
    assert_eq!(t.cell(1, "c"), Some("6"), "extra values are dropped");
    assert_eq!(t.rows[1].len(), 3);
}

#[test]
fn test_values_are_trimmed() {
    let t = table(" name , qty \n  bolt ,  4 ");
    assert_eq!(t.columns, vec!["name".to_owned(), "qty".to_owned()]);
    assert_eq!(t.cell(0, "name"), Some("bolt"));
    assert_eq!(t.cell(0, "qty"), Some("4"));
}

#[test]
fn test_quotes_are_not_interpreted() {
    let t = table("a,b\n\"x,y\",2");
    assert_eq!(t.cell(0, "a"), Some("\"x"));
    assert_eq!(t.cell(0, "b"), Some("y\""));
}

#[test]
fn test_duplicate_headers_keep_last_value() {
    let t = table("a,a\n1,2");
    assert_eq!(t.column_count(), 2);
    assert_eq!(t.cell(0, "a"), Some("2"));
}

#[test]
fn test_empty_input() {
    assert!(matches!(parse_delimited(""), Err(PrepError::EmptyInput)));
    assert!(matches!(parse_delimited("\n  \n\r\n"), Err(PrepError::EmptyInput)));
    assert!(matches!(parse_delimited("\u{FEFF}"), Err(PrepError::EmptyInput)));
}

#[test]
fn test_header_only() {
    let t = table("a,b\n");
    assert_eq!(t.column_count(), 2);
    assert!(t.is_empty());
}

#[test]
fn test_load_bytes_dispatch() {
    let t = load_bytes("Line.CSV", SMALL.as_bytes()).unwrap();
    assert_eq!(t.row_count(), 3);

    match load_bytes("notes.txt", b"a,b") {
        Err(PrepError::UnsupportedFormat(ext)) => assert_eq!(ext, "txt"),
        other => panic!("expected UnsupportedFormat, got {other:?}"),
    }
    assert!(matches!(
        load_bytes("README", b"a,b"),
        Err(PrepError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_load_bytes_rejects_invalid_utf8() {
    let result = load_bytes("data.csv", &[0x61, 0x2c, 0xff, 0xfe]);
    assert!(matches!(result, Err(PrepError::Parse(_))));
}

#[test]
fn test_corrupt_spreadsheet() {
    let result = load_bytes("book.xlsx", b"definitely not a zip archive");
    assert!(
        matches!(result, Err(PrepError::Spreadsheet(_))),
        "got {result:?}"
    );
}

/// Two sheets; the first has a numeric header, a blank row 3 and a short row 4.
const READINGS_XLSX: &[u8] =
    include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/readings.xlsx"));

#[test]
fn test_parse_spreadsheet_first_sheet() {
    let t = parse_spreadsheet(READINGS_XLSX).unwrap();

    assert_eq!(t.columns, vec!["a", "b", "2024"]);
    assert_eq!(t.row_count(), 2, "blank row is skipped");
    assert_eq!(cells(&t, "a"), vec!["1", "3"]);
    assert_eq!(cells(&t, "b"), vec!["2.5", ""]);
    assert_eq!(cells(&t, "2024"), vec!["x", ""]);
    assert!(!t.columns.iter().any(|c| c == "other"), "second sheet ignored");
}

#[test]
fn test_load_bytes_spreadsheet_profile() {
    let t = load_bytes("readings.xlsx", READINGS_XLSX).unwrap();
    let info = analyze_table(&t);

    let a = info_for(&info, "a");
    assert_eq!(a.kind, ColumnType::Number);
    assert_eq!(a.min, Some(1.0));
    assert_eq!(a.max, Some(3.0));
    assert_eq!(info_for(&info, "b").missing, 1);
}

#[test]
fn test_cell_to_string() {
    assert_eq!(cell_to_string(&Data::Empty), "");
    assert_eq!(cell_to_string(&Data::Int(42)), "42");
    assert_eq!(cell_to_string(&Data::Float(2.0)), "2");
    assert_eq!(cell_to_string(&Data::Float(2.5)), "2.5");
    assert_eq!(cell_to_string(&Data::Bool(true)), "true");
    assert_eq!(cell_to_string(&Data::String("Line A".to_owned())), "Line A");
}

#[test]
fn test_write_csv_round_trip() {
    let csv = write_csv(&table(SMALL)).unwrap();
    assert_eq!(csv, "a,b\n1,2\n3,\n5,6\n");
}

#[test]
fn test_write_csv_quotes_only_when_needed() {
    let mut t = table("label,note\nplain,x");
    t.rows[0].insert("label".to_owned(), "x,y".to_owned());
    t.rows[0].insert("note".to_owned(), "say \"hi\"".to_owned());

    let csv = write_csv(&t).unwrap();
    assert_eq!(csv, "label,note\n\"x,y\",\"say \"\"hi\"\"\"\n");
}

#[test]
fn test_write_csv_uses_column_order() {
    let mut t = table("z,a\n1,2");
    t.rows[0].remove("a");
    let csv = write_csv(&t).unwrap();
    assert_eq!(csv, "z,a\n1,\n", "absent cells export as empty");
}

#[test]
fn test_save_and_load_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");

    let t = table(SMALL);
    save_csv(&t, &path).unwrap();
    let loaded = load_path(&path).unwrap();
    assert_eq!(loaded, t);
}

#[test]
fn test_load_missing_path() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_path(&dir.path().join("absent.csv"));
    assert!(result.is_err());
}

#[test]
fn test_export_file_name() {
    assert_eq!(export_file_name(Some("line.csv")), "preprocessed_line.csv");
    assert_eq!(export_file_name(Some("book.xlsx")), "preprocessed_book.xlsx");
    assert_eq!(export_file_name(None), "preprocessed_data.csv");
}
