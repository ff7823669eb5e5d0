use std::collections::BTreeMap;

use crate::classify::record::DifferenceRecord;
use crate::foundation::config::{GridConfig, OverridePolicy};
use crate::foundation::core::DifferenceKind;
use crate::foundation::error::VisdiffResult;
use crate::grid::mapper::{CellCoord, GridSpec, parse_range};
use crate::resolve::specificity::specificity;
use crate::score::scorer::PERFECT_SCORE;
use crate::snapshot::model::{GridRange, Snapshot};

/// Resolved state of one grid cell.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellScore {
    /// Confidence that the cell matches, in `[0.01, 1.0]`.
    pub score: f64,
    /// Selector of the record that set `score`; `None` while untouched.
    pub source_selector: Option<String>,
}

impl Default for CellScore {
    fn default() -> Self {
        Self {
            score: PERFECT_SCORE,
            source_selector: None,
        }
    }
}

/// Scores of every touched cell. Untouched cells read as `1.0`.
///
/// Owned by one comparison run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellScoreMap {
    cells: BTreeMap<CellCoord, CellScore>,
}

impl CellScoreMap {
    /// Score of `cell`, `1.0` when nothing touched it.
    pub fn score_at(&self, cell: CellCoord) -> f64 {
        self.cells.get(&cell).map_or(PERFECT_SCORE, |c| c.score)
    }

    /// Full state of `cell`, if touched.
    pub fn get(&self, cell: CellCoord) -> Option<&CellScore> {
        self.cells.get(&cell)
    }

    /// Touched cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, &CellScore)> {
        self.cells.iter().map(|(c, s)| (*c, s))
    }

    /// Number of touched cells.
    pub fn touched(&self) -> usize {
        self.cells.len()
    }

    /// Row just below the lowest touched cell.
    pub fn rows_touched(&self) -> u32 {
        self.cells
            .keys()
            .map(|c| c.row.saturating_add(1))
            .max()
            .unwrap_or(0)
    }

    /// Every cell of a `rows`-row grid plus any touched cell outside it, row-major.
    ///
    /// Serializes as a JSON object keyed by cell label.
    pub fn export(&self, grid: &GridSpec, rows: u32) -> BTreeMap<CellCoord, CellScore> {
        let mut out: BTreeMap<CellCoord, CellScore> = grid
            .all_cells(rows)
            .map(|cell| (cell, CellScore::default()))
            .collect();
        for (cell, score) in &self.cells {
            out.insert(*cell, score.clone());
        }
        out
    }

    /// Fold one scored record into `cell`.
    pub fn apply(&mut self, cell: CellCoord, incoming: Incoming<'_>, policy: &OverridePolicy) {
        let entry = self.cells.entry(cell).or_default();
        if let Some(next) = fold_cell(entry, incoming, policy, cell.row) {
            *entry = next;
        }
    }
}

/// A scored record about to be folded into a cell.
#[derive(Clone, Copy, Debug)]
pub struct Incoming<'a> {
    /// Record selector.
    pub selector: &'a str,
    /// Record kind, used by the protection waiver.
    pub kind: DifferenceKind,
    /// Record score.
    pub score: f64,
}

/// New cell state after `incoming`, or `None` when the cell keeps its state.
///
/// Order of checks: a cell still at `1.0` adopts anything; a more specific selector always
/// overrides; a less specific selector cannot drag a protected score down by more than the
/// protection gap unless the waiver applies; otherwise the lower score wins and the selector
/// only changes when the score strictly drops.
fn fold_cell(
    current: &CellScore,
    incoming: Incoming<'_>,
    policy: &OverridePolicy,
    row: u32,
) -> Option<CellScore> {
    let adopt = || CellScore {
        score: incoming.score,
        source_selector: Some(incoming.selector.to_string()),
    };

    if current.score >= PERFECT_SCORE {
        return Some(adopt());
    }

    let held = current.source_selector.as_deref().map(specificity);
    let new = Some(specificity(incoming.selector));
    if new > held {
        return Some(adopt());
    }

    if new < held
        && current.score >= policy.protected_score
        && current.score - incoming.score > policy.protection_gap
    {
        let waived = policy
            .waiver
            .as_ref()
            .is_some_and(|w| w.waives(incoming.kind, incoming.score, row));
        return waived.then(adopt);
    }

    (incoming.score < current.score).then(adopt)
}

/// Finds the cells a record covers.
pub trait CellLocator {
    /// Cells covered by `record`. An empty list means the record touches no cells.
    fn cells_for(&self, record: &DifferenceRecord) -> VisdiffResult<Vec<CellCoord>>;
}

/// Locates records through their captured grid ranges, falling back to the snapshots.
///
/// Preference order: candidate range, reference range, then the element's geometry projected
/// onto its snapshot's grid (candidate first). Records without an index cover no cells.
#[derive(Clone, Copy, Debug)]
pub struct SnapshotLocator<'a> {
    reference: &'a Snapshot,
    candidate: &'a Snapshot,
    grid: &'a GridConfig,
}

impl<'a> SnapshotLocator<'a> {
    /// Locator over one snapshot pair.
    pub fn new(reference: &'a Snapshot, candidate: &'a Snapshot, grid: &'a GridConfig) -> Self {
        Self {
            reference,
            candidate,
            grid,
        }
    }
}

impl CellLocator for SnapshotLocator<'_> {
    fn cells_for(&self, record: &DifferenceRecord) -> VisdiffResult<Vec<CellCoord>> {
        let captured = [&record.candidate_range, &record.reference_range]
            .into_iter()
            .flatten()
            .map(GridRange::label)
            .find(|label| !label.is_empty());
        if let Some(label) = captured {
            return parse_range(&label);
        }

        let Some(index) = record.index else {
            return Ok(Vec::new());
        };
        for snapshot in [self.candidate, self.reference] {
            if let Some(el) = snapshot.element(&record.selector, index) {
                let range = el.grid_range_or_project(&snapshot.grid(self.grid));
                return parse_range(&range.label());
            }
        }
        Ok(Vec::new())
    }
}

/// Fold scored records into a fresh cell table.
///
/// `records` must already be in fold order (see
/// [`sort_for_resolution`](crate::resolve::specificity::sort_for_resolution)); later records can
/// override earlier ones on the same cell.
#[tracing::instrument(skip_all)]
pub fn resolve_cells<'r, I, S, L>(
    records: I,
    mut score: S,
    locator: &L,
    policy: &OverridePolicy,
) -> VisdiffResult<CellScoreMap>
where
    I: IntoIterator<Item = &'r DifferenceRecord>,
    S: FnMut(&DifferenceRecord) -> f64,
    L: CellLocator + ?Sized,
{
    let mut map = CellScoreMap::default();
    let mut located = 0usize;
    for record in records {
        let cells = locator.cells_for(record)?;
        if cells.is_empty() {
            tracing::trace!(
                record = %record.target(),
                kind = %record.kind,
                "record covers no cells"
            );
            continue;
        }
        located += 1;
        let incoming = Incoming {
            selector: &record.selector,
            kind: record.kind,
            score: score(record),
        };
        for cell in cells {
            map.apply(cell, incoming, policy);
        }
    }
    tracing::debug!(located, touched = map.touched(), "resolved cell scores");
    Ok(map)
}

#[cfg(test)]
#[path = "../../tests/unit/resolve/cells.rs"]
mod tests;
