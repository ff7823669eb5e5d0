use super::*;

fn payload() -> serde_json::Value {
    serde_json::json!({
        "_viewport": { "width": 1200, "height": 800, "scrollWidth": 1200, "scrollHeight": 2400 },
        "_meta": { "ignored": true },
        "nav": [{
            "selector": "nav",
            "tagName": "nav",
            "position": {
                "x": 0, "y": 0, "width": 1200, "height": 80, "right": 1200, "bottom": 80
            },
            "gridCoordinates": { "topLeft": "A0", "bottomRight": "L0", "range": "A0-L0" },
            "visual": { "display": "flex", "padding": "0px 16px" },
            "typography": { "fontSize": "16px" },
            "background": { "backgroundColor": "rgb(0, 0, 0)" }
        }],
        "nav li": [
            { "position": { "x": 20, "y": 10, "width": 90, "height": 40 } },
            {
                "selector": "nav li:nth-of-type(2)",
                "geometry": { "x": 120, "y": 10, "width": 90, "height": 40 }
            }
        ],
        "footer": []
    })
}

#[test]
fn parses_selectors_viewport_and_styles() {
    let snap = Snapshot::from_value(payload(), &GridConfig::default()).unwrap();
    assert_eq!(snap.selectors().collect::<Vec<_>>(), ["footer", "nav", "nav li"]);
    assert_eq!(snap.viewport().unwrap().width, 1200.0);
    assert_eq!(snap.element_count(), 3);

    let nav = snap.element("nav", 0).unwrap();
    assert_eq!(nav.tag_name.as_deref(), Some("nav"));
    assert_eq!(nav.visual_style["padding"], "0px 16px");
    assert_eq!(nav.grid_range.as_ref().unwrap().range, "A0-L0");
    assert!(snap.elements("footer").is_empty());
    assert!(snap.elements("h2").is_empty());
}

#[test]
fn missing_grid_ranges_are_derived_from_geometry() {
    let snap = Snapshot::from_value(payload(), &GridConfig::default()).unwrap();
    let first = snap.element("nav li", 0).unwrap();
    assert_eq!(first.selector, "nav li");
    assert_eq!(first.grid_range.as_ref().unwrap().range, "A0-B0");

    let second = snap.element("nav li", 1).unwrap();
    assert_eq!(second.selector, "nav li:nth-of-type(2)");
    assert_eq!(second.grid_range.as_ref().unwrap().range, "B0-C0");
}

#[test]
fn non_object_snapshot_is_fatal() {
    let err = Snapshot::from_value(serde_json::json!([1, 2]), &GridConfig::default()).unwrap_err();
    assert!(matches!(err, VisdiffError::Validation(_)));
}

#[test]
fn invalid_entries_report_every_path() {
    let value = serde_json::json!({
        "nav": { "not": "an array" },
        "nav li": [
            { "position": { "x": 1, "y": 2, "width": 3, "height": 4 } },
            { "position": "oops" }
        ]
    });
    let err = Snapshot::from_value(value, &GridConfig::default()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("$[\"nav\"]: selector entry must be an array"), "{msg}");
    assert!(msg.contains("$[\"nav li\"][1]"), "{msg}");
}

#[test]
fn reader_reports_bad_json_as_serde_error() {
    let err = Snapshot::from_reader("{ nope".as_bytes(), &GridConfig::default()).unwrap_err();
    assert!(matches!(err, VisdiffError::Serde(_)));
}

#[test]
fn grid_range_label_rebuilds_from_corners() {
    let r = GridRange {
        top_left: "A1".into(),
        bottom_right: "C4".into(),
        range: String::new(),
    };
    assert_eq!(r.label(), "A1-C4");
    assert_eq!(GridRange::default().label(), "");
}
