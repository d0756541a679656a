use super::{SMALL, info_for, table};
use crate::analyser::logic::*;

#[test]
fn test_small_table_column_a() {
    let info = analyze_table(&table(SMALL));
    let a = info_for(&info, "a");

    assert_eq!(a.kind, ColumnType::Number);
    assert_eq!(a.missing, 0);
    assert_eq!(a.unique, 3);
    assert_eq!(a.mean, Some(3.0));
    assert_eq!(a.median, Some(3.0));
    // sqrt(8 / 3) rounded
    assert_eq!(a.std, Some(1.63));
}

#[test]
fn test_info_follows_header_order() {
    let info = analyze_table(&table("z,m,a\n1,2,3"));
    let names: Vec<&str> = info.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["z", "m", "a"]);
}

#[test]
fn test_mostly_text_column_is_string() {
    let info = analyze_table(&table("id,code\n1,A1\n2,B2\n3,7"));
    let code = info_for(&info, "code");

    assert_eq!(code.kind, ColumnType::String);
    assert!(!code.has_stats());
    assert_eq!(code.unique, 3);
}

#[test]
fn test_numeric_column_tolerates_some_text() {
    // 5 of 6 parse, above the 80% threshold
    let info = analyze_table(&table("v\n1\n2\n3\n4\n5\nn/a"));
    let v = info_for(&info, "v");

    assert_eq!(v.kind, ColumnType::Number);
    assert_eq!(v.mean, Some(3.0), "text cells are excluded from stats");
    assert_eq!(v.min, Some(1.0));
    assert_eq!(v.max, Some(5.0));
}

#[test]
fn test_missing_and_unique_counts() {
    let info = analyze_table(&table("k,c\n1,x\n2,\n3,x\n4,y"));
    let c = info_for(&info, "c");

    assert_eq!(c.missing, 1);
    assert_eq!(c.unique, 2);
    assert!(c.missing + c.unique <= 4);
}

#[test]
fn test_all_missing_column() {
    let info = analyze_table(&table("k,c\n1,\n2,"));
    let c = info_for(&info, "c");

    assert_eq!(c.kind, ColumnType::String, "no values means no numeric evidence");
    assert_eq!(c.missing, 2);
    assert_eq!(c.unique, 0);
}

#[test]
fn test_mean_is_rounded_to_two_decimals() {
    let info = analyze_table(&table("v\n1\n2\n2"));
    let v = info_for(&info, "v");

    assert_eq!(v.mean, Some(1.67));
    assert_eq!(v.median, Some(2.0));
}

#[test]
fn test_missing_pct() {
    let info = analyze_table(&table(SMALL));
    let b = info_for(&info, "b");
    assert!((b.missing_pct(3) - 100.0 / 3.0).abs() < 1e-9);
    assert!((b.missing_pct(0)).abs() < f64::EPSILON);
}

#[test]
fn test_analysis_is_pure() {
    let t = table("k,c\n1,x\n2,\n3,x\n4,y");
    let before = t.clone();

    let first = analyze_table(&t);
    let second = analyze_table(&t);
    assert_eq!(first, second);
    assert_eq!(t, before);
}
