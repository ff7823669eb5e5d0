use super::*;
use crate::foundation::core::{DifferenceKind, Severity};

fn rec(selector: &str, delta: &str) -> DifferenceRecord {
    DifferenceRecord::new(
        DifferenceKind::DimensionMismatch,
        selector,
        Severity::High,
        "msg",
    )
    .at_index(0)
    .with_differences(vec![delta.to_string()])
}

#[test]
fn identical_lists_share_a_fingerprint() {
    let a = vec![rec("nav", "Width: Remote 10px, Local 20px (diff: -10px)")];
    assert_eq!(fingerprint_differences(&a), fingerprint_differences(&a.clone()));
}

#[test]
fn deltas_and_order_change_the_fingerprint() {
    let a = rec("nav", "Width: Remote 10px, Local 20px (diff: -10px)");
    let b = rec("nav", "Width: Remote 10px, Local 21px (diff: -11px)");
    let c = rec("h1", "Width: Remote 10px, Local 20px (diff: -10px)");
    assert_ne!(
        fingerprint_differences(&[a.clone()]),
        fingerprint_differences(&[b])
    );
    assert_ne!(
        fingerprint_differences(&[a.clone(), c.clone()]),
        fingerprint_differences(&[c, a])
    );
}

#[test]
fn message_is_not_part_of_the_identity() {
    let a = rec("nav", "d");
    let mut b = a.clone();
    b.message = "reworded".to_string();
    assert_eq!(fingerprint_differences(&[a]), fingerprint_differences(&[b]));
}

#[test]
fn hex_form_round_trips_through_serde() {
    let fp = fingerprint_differences(&[]);
    let json = serde_json::to_string(&fp).unwrap();
    assert_eq!(json.len(), 34);
    let back: DiffFingerprint = serde_json::from_str(&json).unwrap();
    assert_eq!(back, fp);
    assert!(serde_json::from_str::<DiffFingerprint>("\"xyz\"").is_err());
}
