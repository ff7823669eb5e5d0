use super::*;

#[test]
fn empty_and_unparseable_text_yield_no_samples() {
    let none: [&str; 0] = [];
    assert_eq!(parse_magnitude(&none), MagnitudeSummary::default());

    let s = parse_magnitude(&[
        "color: Remote \"red\", Local \"blue\"",
        "Grid coordinates: Remote A0-B0, Local A1-B1",
    ]);
    assert_eq!(s.sample_count, 0);
    assert!(!s.has_magnitude());
}

#[test]
fn diff_annotation_wins_and_is_absolute() {
    let s = parse_magnitude(&["Height: Remote 1625px, Local 2193px (diff: -568px)"]);
    assert_eq!(s.sample_count, 1);
    assert_eq!(s.max_magnitude, 568.0);
    assert_eq!(s.avg_magnitude, 568.0);
}

#[test]
fn position_delta_counts_once() {
    let s = parse_magnitude(&["X position: Remote 52px, Local 12px (diff: 40px)"]);
    assert_eq!(s.sample_count, 1);
    assert_eq!(s.max_magnitude, 40.0);
}

#[test]
fn percent_annotation_is_recognized() {
    let s = parse_magnitude(&["opacity (diff: 12.5%)"]);
    assert_eq!(s.sample_count, 1);
    assert_eq!(s.max_magnitude, 12.5);
}

#[test]
fn paired_quoted_pixels() {
    let s = parse_magnitude(&[
        "fontSize: Remote \"16px\", Local \"18px\"",
        "lineHeight: Remote \"24px\", Local \"24px\"",
    ]);
    assert_eq!(s.sample_count, 1);
    assert_eq!(s.max_magnitude, 2.0);
}

#[test]
fn box_values_compare_positionally() {
    let s = parse_magnitude(&["margin: Remote \"0px 0px 80px\", Local \"0px 0px 16px 4px\""]);
    assert_eq!(s.sample_count, 2);
    assert_eq!(s.max_magnitude, 64.0);
    assert_eq!(s.avg_magnitude, 34.0);
}

#[test]
fn box_values_treat_keywords_as_zero() {
    let s = parse_magnitude(&["padding: Remote \"auto 8px\", Local \"0px 4px\""]);
    assert_eq!(s.sample_count, 1);
    assert_eq!(s.max_magnitude, 4.0);
}

#[test]
fn average_spans_descriptions() {
    let s = parse_magnitude(&[
        "Width: Remote 100px, Local 90px (diff: 10px)",
        "Height: Remote 50px, Local 20px (diff: 30px)",
    ]);
    assert_eq!(s.sample_count, 2);
    assert_eq!(s.max_magnitude, 30.0);
    assert_eq!(s.avg_magnitude, 20.0);
}
