use std::collections::{BTreeMap, BTreeSet};

use crate::classify::record::DifferenceRecord;
use crate::foundation::config::{ClassifierConfig, GridConfig};
use crate::foundation::core::{DifferenceKind, Severity};
use crate::grid::mapper::GridSpec;
use crate::snapshot::model::{ElementSnapshot, GridRange, Snapshot};

/// Compare two snapshots and list every mismatch.
///
/// Selectors are visited in sorted order and elements by index, so the output is a pure function
/// of its inputs. A selector missing from one side counts as zero elements there.
#[tracing::instrument(skip_all)]
pub fn classify_differences(
    reference: &Snapshot,
    candidate: &Snapshot,
    config: &ClassifierConfig,
    grid: &GridConfig,
) -> Vec<DifferenceRecord> {
    let pair = PairContext {
        config,
        reference_grid: reference.grid(grid),
        candidate_grid: candidate.grid(grid),
    };

    let selectors: BTreeSet<&str> = reference.selectors().chain(candidate.selectors()).collect();
    let mut out = Vec::new();
    for selector in selectors {
        classify_selector(
            selector,
            reference.elements(selector),
            candidate.elements(selector),
            &pair,
            &mut out,
        );
    }

    tracing::debug!(
        selectors = reference.selectors().count().max(candidate.selectors().count()),
        differences = out.len(),
        "classified snapshot pair"
    );
    out
}

struct PairContext<'a> {
    config: &'a ClassifierConfig,
    reference_grid: GridSpec,
    candidate_grid: GridSpec,
}

fn classify_selector(
    selector: &str,
    reference: &[ElementSnapshot],
    candidate: &[ElementSnapshot],
    pair: &PairContext<'_>,
    out: &mut Vec<DifferenceRecord>,
) {
    if reference.len() != candidate.len() {
        let mut rec = DifferenceRecord::new(
            DifferenceKind::CountMismatch,
            selector,
            Severity::High,
            format!(
                "Element count mismatch for {selector}: reference has {}, candidate has {}",
                reference.len(),
                candidate.len()
            ),
        );
        rec.reference_count = Some(reference.len());
        rec.candidate_count = Some(candidate.len());
        out.push(rec);
    }

    for index in 0..reference.len().max(candidate.len()) {
        match (reference.get(index), candidate.get(index)) {
            (Some(r), Some(c)) => compare_pair(selector, index, r, c, pair, out),
            (None, Some(_)) => out.push(
                DifferenceRecord::new(
                    DifferenceKind::MissingReference,
                    selector,
                    Severity::High,
                    format!("{selector}[{index}] exists in the candidate but not in the reference"),
                )
                .at_index(index),
            ),
            (Some(_), None) => out.push(
                DifferenceRecord::new(
                    DifferenceKind::MissingCandidate,
                    selector,
                    Severity::High,
                    format!("{selector}[{index}] exists in the reference but not in the candidate"),
                )
                .at_index(index),
            ),
            (None, None) => {}
        }
    }
}

fn compare_pair(
    selector: &str,
    index: usize,
    reference: &ElementSnapshot,
    candidate: &ElementSnapshot,
    pair: &PairContext<'_>,
    out: &mut Vec<DifferenceRecord>,
) {
    let reference_range = reference.grid_range_or_project(&pair.reference_grid);
    let candidate_range = candidate.grid_range_or_project(&pair.candidate_grid);
    let target = format!("{selector}[{index}]");
    let paired = |kind: DifferenceKind, severity: Severity, message: String, deltas: Vec<String>| {
        DifferenceRecord::new(kind, selector, severity, message)
            .at_index(index)
            .with_ranges(reference_range.clone(), candidate_range.clone())
            .with_differences(deltas)
    };

    let (position, grid_moved) =
        position_deltas(reference, candidate, &reference_range, &candidate_range, pair.config);
    if !position.is_empty() {
        let severity = if grid_moved {
            Severity::High
        } else {
            Severity::Medium
        };
        let message = format!(
            "Position mismatch for {target}: Remote {}, Local {}",
            reference_range.label(),
            candidate_range.label()
        );
        out.push(paired(
            DifferenceKind::PositionMismatch,
            severity,
            message,
            position,
        ));
    }

    let dimension = dimension_deltas(reference, candidate, pair.config);
    if !dimension.is_empty() {
        let message = format!("Dimension mismatch for {target}: {}", dimension.join(", "));
        out.push(paired(
            DifferenceKind::DimensionMismatch,
            Severity::High,
            message,
            dimension,
        ));
    }

    let visual = style_deltas(
        &reference.visual_style,
        &candidate.visual_style,
        &pair.config.visual_properties,
    );
    if !visual.is_empty() {
        let message = format!("Visual property mismatch for {target}: {}", visual.join(", "));
        out.push(paired(
            DifferenceKind::VisualMismatch,
            Severity::Medium,
            message,
            visual,
        ));
    }

    let typography = style_deltas(
        &reference.typography,
        &candidate.typography,
        &pair.config.typography_properties,
    );
    if !typography.is_empty() {
        let message = format!("Typography mismatch for {target}: {}", typography.join(", "));
        out.push(paired(
            DifferenceKind::TypographyMismatch,
            Severity::Medium,
            message,
            typography,
        ));
    }
}

/// Pixel deltas beyond tolerance plus a textual grid comparison; the flag reports a grid move.
fn position_deltas(
    reference: &ElementSnapshot,
    candidate: &ElementSnapshot,
    reference_range: &GridRange,
    candidate_range: &GridRange,
    config: &ClassifierConfig,
) -> (Vec<String>, bool) {
    let tol = config.position_tolerance_px;
    let (r, c) = (reference.geometry, candidate.geometry);
    let mut deltas = Vec::new();

    if (r.x - c.x).abs() > tol {
        deltas.push(format!(
            "X position: Remote {}px, Local {}px (diff: {}px)",
            r.x,
            c.x,
            rounded(r.x - c.x)
        ));
    }
    if (r.y - c.y).abs() > tol {
        deltas.push(format!(
            "Y position: Remote {}px, Local {}px (diff: {}px)",
            r.y,
            c.y,
            rounded(r.y - c.y)
        ));
    }

    let (r_label, c_label) = (reference_range.label(), candidate_range.label());
    let grid_moved = r_label != c_label;
    if grid_moved {
        deltas.push(format!("Grid coordinates: Remote {r_label}, Local {c_label}"));
    }
    (deltas, grid_moved)
}

fn dimension_deltas(
    reference: &ElementSnapshot,
    candidate: &ElementSnapshot,
    config: &ClassifierConfig,
) -> Vec<String> {
    let tol = config.dimension_tolerance_px;
    let (r, c) = (reference.geometry, candidate.geometry);
    let mut deltas = Vec::new();
    for (label, rv, cv) in [("Width", r.width, c.width), ("Height", r.height, c.height)] {
        if (rv - cv).abs() > tol {
            deltas.push(format!(
                "{label}: Remote {}px, Local {}px (diff: {}px)",
                rounded(rv),
                rounded(cv),
                rounded(rv - cv)
            ));
        }
    }
    deltas
}

/// Exact string comparison; a property missing on one side compares as the empty string.
fn style_deltas(
    reference: &BTreeMap<String, String>,
    candidate: &BTreeMap<String, String>,
    properties: &[String],
) -> Vec<String> {
    properties
        .iter()
        .filter_map(|prop| {
            let r = reference.get(prop).map_or("", String::as_str);
            let c = candidate.get(prop).map_or("", String::as_str);
            (r != c).then(|| format!("{prop}: Remote \"{r}\", Local \"{c}\""))
        })
        .collect()
}

fn rounded(v: f64) -> i64 {
    v.round() as i64
}

#[cfg(test)]
#[path = "../../tests/unit/classify/compare.rs"]
mod tests;
