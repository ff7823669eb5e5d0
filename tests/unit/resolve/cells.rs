use super::*;
use crate::foundation::config::{ProtectionWaiver, RowSpan};
use crate::foundation::core::{Geometry, Severity, Viewport};
use crate::snapshot::model::ElementSnapshot;

struct Fixed(Vec<CellCoord>);

impl CellLocator for Fixed {
    fn cells_for(&self, _: &DifferenceRecord) -> VisdiffResult<Vec<CellCoord>> {
        Ok(self.0.clone())
    }
}

fn a0() -> CellCoord {
    CellCoord::new(0, 0)
}

fn rec(kind: DifferenceKind, selector: &str, message: &str) -> DifferenceRecord {
    DifferenceRecord::new(kind, selector, Severity::High, message)
}

/// Fold `(selector, kind, score)` triples into A0, in the given order.
fn fold(steps: &[(&str, DifferenceKind, f64)], policy: &OverridePolicy) -> CellScore {
    let records: Vec<DifferenceRecord> = steps
        .iter()
        .enumerate()
        .map(|(i, (sel, kind, _))| rec(*kind, sel, &i.to_string()))
        .collect();
    let map = resolve_cells(
        &records,
        |r| {
            let i: usize = r.message.parse().unwrap();
            steps[i].2
        },
        &Fixed(vec![a0()]),
        policy,
    )
    .unwrap();
    map.get(a0()).cloned().unwrap()
}

const DIM: DifferenceKind = DifferenceKind::DimensionMismatch;
const VIS: DifferenceKind = DifferenceKind::VisualMismatch;

#[test]
fn more_specific_selector_overrides_even_when_better() {
    let cell = fold(&[("nav", DIM, 0.2), ("nav li", VIS, 0.9)], &OverridePolicy::default());
    assert_eq!(cell.score, 0.9);
    assert_eq!(cell.source_selector.as_deref(), Some("nav li"));
}

#[test]
fn less_specific_selector_cannot_sink_a_protected_cell() {
    let cell = fold(&[("nav li", VIS, 0.97), ("nav", VIS, 0.3)], &OverridePolicy::default());
    assert_eq!(cell.score, 0.97);
    assert_eq!(cell.source_selector.as_deref(), Some("nav li"));
}

#[test]
fn small_gap_lets_worse_score_through() {
    let cell = fold(&[("nav li", VIS, 0.96), ("nav", VIS, 0.8)], &OverridePolicy::default());
    assert_eq!(cell.score, 0.8);
    assert_eq!(cell.source_selector.as_deref(), Some("nav"));
}

#[test]
fn waiver_lets_near_zero_container_break_through() {
    let steps = [("nav li", VIS, 0.97), ("section", DIM, 0.05)];
    let cell = fold(&steps, &OverridePolicy::default());
    assert_eq!(cell.score, 0.05);
    assert_eq!(cell.source_selector.as_deref(), Some("section"));

    let no_waiver = OverridePolicy {
        waiver: None,
        ..OverridePolicy::default()
    };
    assert_eq!(fold(&steps, &no_waiver).score, 0.97);

    let safe_row_zero = OverridePolicy {
        waiver: Some(ProtectionWaiver {
            safe_rows: Some(RowSpan { start: 0, end: 3 }),
            ..ProtectionWaiver::default()
        }),
        ..OverridePolicy::default()
    };
    assert_eq!(fold(&steps, &safe_row_zero).score, 0.97);

    // Wrong kind for the waiver.
    let cell = fold(&[("nav li", VIS, 0.97), ("section", VIS, 0.05)], &OverridePolicy::default());
    assert_eq!(cell.score, 0.97);
}

#[test]
fn equal_specificity_keeps_the_worse_score() {
    let policy = OverridePolicy::default();
    let cell = fold(&[("nav", VIS, 0.5), ("header", VIS, 0.7)], &policy);
    assert_eq!(cell.score, 0.5);
    assert_eq!(cell.source_selector.as_deref(), Some("nav"));

    let cell = fold(&[("nav", VIS, 0.5), ("header", VIS, 0.5)], &policy);
    assert_eq!(cell.source_selector.as_deref(), Some("nav"));

    let cell = fold(&[("nav", VIS, 0.5), ("header", VIS, 0.4)], &policy);
    assert_eq!(cell.score, 0.4);
    assert_eq!(cell.source_selector.as_deref(), Some("header"));
}

#[test]
fn untouched_cells_read_perfect() {
    let map = CellScoreMap::default();
    assert_eq!(map.score_at(CellCoord::new(3, 7)), 1.0);
    assert_eq!(map.touched(), 0);
    assert_eq!(map.rows_touched(), 0);
}

#[test]
fn export_covers_the_grid_row_major() {
    let grid = GridSpec::new(&GridConfig::default(), 1200.0);
    let records = vec![rec(DIM, "nav", "nav")];
    let map = resolve_cells(
        &records,
        |_| 0.25,
        &Fixed(vec![CellCoord::new(1, 0), CellCoord::new(0, 2)]),
        &OverridePolicy::default(),
    )
    .unwrap();
    assert_eq!(map.rows_touched(), 3);

    let export = map.export(&grid, 2);
    assert_eq!(export.len(), 12 * 2 + 1);
    let labels: Vec<String> = export.keys().take(3).map(ToString::to_string).collect();
    assert_eq!(labels, ["A0", "B0", "C0"]);
    assert_eq!(export[&CellCoord::new(1, 0)].score, 0.25);
    assert_eq!(export[&CellCoord::new(0, 0)], CellScore::default());
    assert!(export.contains_key(&CellCoord::new(0, 2)));

    let json = serde_json::to_string(&export).unwrap();
    let expected = concat!(
        r#"{"A0":{"score":1.0,"sourceSelector":null},"#,
        r#""B0":{"score":0.25,"sourceSelector":"nav"}"#,
    );
    assert!(json.starts_with(expected));
}

fn viewport() -> Option<Viewport> {
    Some(Viewport {
        width: 1200.0,
        height: 800.0,
        scroll_width: 1200.0,
        scroll_height: 1600.0,
    })
}

fn range(label: &str) -> GridRange {
    GridRange {
        range: label.to_string(),
        ..GridRange::default()
    }
}

#[test]
fn locator_prefers_candidate_range() {
    let empty = Snapshot::new(viewport());
    let grid = GridConfig::default();
    let locator = SnapshotLocator::new(&empty, &empty, &grid);

    let r = rec(DIM, "nav", "m")
        .at_index(0)
        .with_ranges(range("A0-B0"), range("C1-C1"));
    assert_eq!(locator.cells_for(&r).unwrap(), [CellCoord::new(2, 1)]);

    let mut r = r;
    r.candidate_range = None;
    assert_eq!(locator.cells_for(&r).unwrap().len(), 2);
}

#[test]
fn malformed_range_touches_nothing() {
    let empty = Snapshot::new(viewport());
    let grid = GridConfig::default();
    let locator = SnapshotLocator::new(&empty, &empty, &grid);
    let r = rec(DIM, "nav", "m")
        .at_index(0)
        .with_ranges(range("A0"), range("A0"));
    assert!(locator.cells_for(&r).unwrap().is_empty());

    let bad = rec(DIM, "nav", "m")
        .at_index(0)
        .with_ranges(range("A0-?"), range("A0-?"));
    assert!(locator.cells_for(&bad).is_err());
}

#[test]
fn locator_projects_missing_elements_from_snapshots() {
    let reference = Snapshot::new(viewport()).with_elements(
        "footer",
        vec![ElementSnapshot::new(
            "footer",
            Geometry::new(0.0, 1450.0, 250.0, 100.0),
        )],
    );
    let candidate = Snapshot::new(viewport());
    let grid = GridConfig::default();
    let locator = SnapshotLocator::new(&reference, &candidate, &grid);

    let missing = rec(DifferenceKind::MissingCandidate, "footer", "m").at_index(0);
    let cells: Vec<String> = locator
        .cells_for(&missing)
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(cells, ["A14", "B14", "C14", "A15", "B15", "C15"]);

    let count = rec(DifferenceKind::CountMismatch, "footer", "m");
    assert!(locator.cells_for(&count).unwrap().is_empty());
}
