use super::*;
use time::macros::datetime;

use crate::foundation::core::DifferenceKind;

fn rec(
    kind: DifferenceKind,
    selector: &str,
    severity: Severity,
    message: &str,
) -> DifferenceRecord {
    DifferenceRecord::new(kind, selector, severity, message)
}

fn sample() -> Vec<DifferenceRecord> {
    vec![
        rec(DifferenceKind::VisualMismatch, "h1", Severity::Medium, "v"),
        rec(DifferenceKind::CountMismatch, "nav li", Severity::High, "count"),
        rec(DifferenceKind::MissingCandidate, "nav li", Severity::High, "missing"),
        rec(DifferenceKind::TypographyMismatch, "h1", Severity::Medium, "t"),
    ]
}

fn at() -> OffsetDateTime {
    datetime!(2025-03-04 05:06:07 UTC)
}

#[test]
fn summary_counts_and_grouping() {
    let report = build_report_at(sample(), at());
    assert_eq!(report.timestamp, "2025-03-04T05:06:07.000Z");
    assert_eq!(report.summary.total_differences, 4);
    assert_eq!(report.summary.by_type["count_mismatch"], 1);
    assert_eq!(report.summary.by_type["visual_mismatch"], 1);
    assert_eq!(
        report.summary.by_severity,
        SeverityCounts {
            high: 2,
            medium: 2,
            low: 0
        }
    );
    let nav: Vec<&str> = report.by_selector["nav li"]
        .iter()
        .map(|d| d.message.as_str())
        .collect();
    assert_eq!(nav, ["count", "missing"]);
    assert!(!report.is_clean());
}

#[test]
fn high_severity_recommendation_previews_five_messages() {
    let diffs: Vec<DifferenceRecord> = (0..7)
        .map(|i| rec(DifferenceKind::DimensionMismatch, "div", Severity::High, &format!("m{i}")))
        .collect();
    let report = build_report_at(diffs, at());
    assert_eq!(report.recommendations.len(), 1);
    let r = &report.recommendations[0];
    assert_eq!(r.priority, Severity::High);
    assert_eq!(r.count, 7);
    assert_eq!(r.examples, ["m0", "m1", "m2", "m3", "m4"]);
}

#[test]
fn empty_run_is_clean() {
    let report = build_report_at(Vec::new(), at());
    assert!(report.is_clean());
    assert!(report.recommendations.is_empty());
    assert_eq!(report.summary.by_severity, SeverityCounts::default());
}

#[test]
fn prioritized_puts_high_first_and_keeps_order() {
    let report = build_report_at(sample(), at());
    let order: Vec<&str> = report
        .prioritized()
        .into_iter()
        .map(|d| d.message.as_str())
        .collect();
    assert_eq!(order, ["count", "missing", "v", "t"]);
}

#[test]
fn wire_shape_uses_camel_case() {
    let report = build_report_at(sample(), at());
    let v = serde_json::to_value(&report).unwrap();
    assert_eq!(v["summary"]["totalDifferences"], 4);
    assert_eq!(v["summary"]["bySeverity"]["low"], 0);
    assert_eq!(v["differences"][1]["type"], "count_mismatch");
    assert_eq!(v["recommendations"][0]["priority"], "high");
    assert!(v["bySelector"]["h1"].is_array());

    let back = Report::from_reader(serde_json::to_string(&report).unwrap().as_bytes()).unwrap();
    assert_eq!(back, report);
}
