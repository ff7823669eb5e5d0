use super::*;

#[test]
fn severity_sorts_high_first() {
    let mut v = vec![Severity::Low, Severity::High, Severity::Medium];
    v.sort();
    assert_eq!(v, Severity::ALL.to_vec());
}

#[test]
fn difference_kind_names_match_serde() {
    for kind in [
        DifferenceKind::CountMismatch,
        DifferenceKind::MissingReference,
        DifferenceKind::MissingCandidate,
        DifferenceKind::PositionMismatch,
        DifferenceKind::DimensionMismatch,
        DifferenceKind::VisualMismatch,
        DifferenceKind::TypographyMismatch,
    ] {
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, format!("\"{}\"", kind.as_str()));
    }
    assert!(!DifferenceKind::CountMismatch.is_paired());
    assert!(DifferenceKind::TypographyMismatch.is_paired());
}

#[test]
fn geometry_to_rect_spans_box() {
    let r = Geometry::new(10.0, 20.0, 30.0, 40.0).to_rect();
    assert_eq!((r.x0, r.y0, r.x1, r.y1), (10.0, 20.0, 40.0, 60.0));
}

#[test]
fn viewport_document_height_uses_larger_extent() {
    let v: Viewport = serde_json::from_str(
        r#"{ "width": 1200, "height": 800, "scrollWidth": 1200, "scrollHeight": 2450 }"#,
    )
    .unwrap();
    assert_eq!(v.document_height(), 2450.0);

    let short = Viewport {
        scroll_height: 0.0,
        ..v
    };
    assert_eq!(short.document_height(), 800.0);
}
