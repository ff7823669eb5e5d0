use super::*;
use crate::classify::record::DifferenceRecord;
use crate::foundation::core::DifferenceKind;
use crate::report::builder::build_report_at;

fn report() -> Report {
    build_report_at(
        vec![
            DifferenceRecord::new(DifferenceKind::DimensionMismatch, "nav", Severity::High, "d"),
            DifferenceRecord::new(DifferenceKind::VisualMismatch, "h1", Severity::Medium, "v"),
        ],
        time::OffsetDateTime::now_utc(),
    )
}

#[test]
fn consistent_report_passes_with_high_warning() {
    let v = verify_report(&report());
    assert!(v.passed, "{:?}", v.errors);
    assert_eq!(v.warnings, ["1 high-priority visual differences detected"]);
}

#[test]
fn clean_report_has_no_warnings() {
    let v = verify_report(&build_report_at(Vec::new(), time::OffsetDateTime::now_utc()));
    assert!(v.passed);
    assert!(v.warnings.is_empty());
}

#[test]
fn tampered_summary_is_reported() {
    let mut r = report();
    r.summary.total_differences = 5;
    r.summary.by_severity.medium = 0;
    let v = verify_report(&r);
    assert!(!v.passed);
    assert_eq!(v.errors.len(), 2);
    assert!(v.errors[0].contains("totalDifferences"));
    assert!(v.errors[1].contains("bySeverity.medium"));
}

#[test]
fn broken_grouping_is_reported() {
    let mut r = report();
    let moved = r.by_selector.remove("h1").unwrap();
    r.by_selector.insert("nav".to_string(), moved);
    let v = verify_report(&r);
    assert!(!v.passed);
    assert!(v.errors.iter().any(|e| e.contains("holds a record for 'h1'")));
}
