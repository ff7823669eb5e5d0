use std::collections::BTreeMap;
use std::path::Path;

use rayon::prelude::*;
use time::OffsetDateTime;

use crate::classify::compare::classify_differences;
use crate::classify::record::DifferenceRecord;
use crate::foundation::config::EngineConfig;
use crate::foundation::error::{VisdiffError, VisdiffResult};
use crate::grid::mapper::{CellCoord, GridSpec};
use crate::report::builder::{Report, build_report_at};
use crate::report::verify::{Verification, verify_report};
use crate::resolve::cells::{CellScore, CellScoreMap, SnapshotLocator, resolve_cells};
use crate::resolve::specificity::{RecordOrder, resolution_order, sort_for_resolution};
use crate::score::magnitude::parse_magnitude;
use crate::score::scorer::score_difference;
use crate::snapshot::model::Snapshot;

/// Options controlling how a [`ComparisonSession`] runs.
#[derive(Clone, Debug)]
pub struct SessionOpts {
    /// Override the number of rayon worker threads for batches. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Order records are folded into the cell table.
    pub order: RecordOrder,
}

impl Default for SessionOpts {
    fn default() -> Self {
        Self {
            threads: None,
            order: resolution_order,
        }
    }
}

/// Magnitude statistics of one scoring pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScoringStats {
    /// Records scored.
    pub scored: usize,
    /// Records scored from a parsed magnitude rather than severity alone.
    pub with_magnitude: usize,
    /// Largest magnitude among them.
    pub max_magnitude: f64,
    /// Mean of their largest magnitudes.
    pub avg_magnitude: f64,
}

/// Everything one comparison run produced.
#[derive(Clone, Debug)]
pub struct Comparison {
    /// Aggregated report; its `differences` are in classifier order.
    pub report: Report,
    /// Resolved per-cell scores.
    pub cells: CellScoreMap,
    /// Candidate-side grid the cells refer to.
    pub grid: GridSpec,
    /// Rows covered by the candidate document or by any touched cell.
    pub rows: u32,
    /// Scoring statistics.
    pub stats: ScoringStats,
}

impl Comparison {
    /// Differences in classifier order.
    pub fn differences(&self) -> &[DifferenceRecord] {
        &self.report.differences
    }

    /// `true` when no difference was found.
    pub fn is_clean(&self) -> bool {
        self.report.is_clean()
    }

    /// Every cell of the candidate grid with its score, row-major.
    pub fn cell_export(&self) -> BTreeMap<CellCoord, CellScore> {
        self.cells.export(&self.grid, self.rows)
    }

    /// Structural check of the report.
    pub fn verify(&self) -> Verification {
        verify_report(&self.report)
    }
}

/// Runs the comparison pipeline with one engine configuration.
///
/// A session holds no per-run state, so one session can compare any number of snapshot pairs,
/// including concurrently.
#[derive(Clone, Debug)]
pub struct ComparisonSession {
    config: EngineConfig,
    opts: SessionOpts,
}

impl ComparisonSession {
    /// Session with default options.
    pub fn new(config: EngineConfig) -> VisdiffResult<Self> {
        Self::with_opts(config, SessionOpts::default())
    }

    /// Session with explicit options.
    pub fn with_opts(config: EngineConfig, opts: SessionOpts) -> VisdiffResult<Self> {
        config.validate()?;
        if opts.threads == Some(0) {
            return Err(VisdiffError::validation(
                "session 'threads' must be >= 1 when set",
            ));
        }
        Ok(Self { config, opts })
    }

    /// Engine configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Load a snapshot, deriving grid ranges with this session's grid.
    pub fn load_snapshot(&self, path: impl AsRef<Path>) -> VisdiffResult<Snapshot> {
        Snapshot::from_path(path, &self.config.grid)
    }

    /// Compare two snapshots, stamping the report with the current time.
    pub fn compare(&self, reference: &Snapshot, candidate: &Snapshot) -> VisdiffResult<Comparison> {
        self.compare_at(reference, candidate, OffsetDateTime::now_utc())
    }

    /// Compare two snapshots with a fixed report timestamp.
    #[tracing::instrument(
        skip_all,
        fields(
            reference = reference.element_count(),
            candidate = candidate.element_count()
        )
    )]
    pub fn compare_at(
        &self,
        reference: &Snapshot,
        candidate: &Snapshot,
        timestamp: OffsetDateTime,
    ) -> VisdiffResult<Comparison> {
        let differences = classify_differences(
            reference,
            candidate,
            &self.config.classifier,
            &self.config.grid,
        );
        let (cells, stats) = self.resolve(&differences, reference, candidate)?;
        let report = build_report_at(differences, timestamp);

        let (grid, rows) = self.export_extent(candidate, &cells);

        tracing::info!(
            differences = report.summary.total_differences,
            high = report.summary.by_severity.high,
            touched = cells.touched(),
            "comparison finished"
        );
        Ok(Comparison {
            report,
            cells,
            grid,
            rows,
            stats,
        })
    }

    /// Compare independent snapshot pairs in parallel. Results keep the input order.
    pub fn compare_batch(
        &self,
        pairs: &[(Snapshot, Snapshot)],
    ) -> VisdiffResult<Vec<VisdiffResult<Comparison>>> {
        let timestamp = OffsetDateTime::now_utc();
        let pool = build_thread_pool(self.opts.threads)?;
        Ok(pool.install(|| {
            pairs
                .par_iter()
                .map(|(reference, candidate)| self.compare_at(reference, candidate, timestamp))
                .collect()
        }))
    }

    /// Recompute the cell table of a persisted report.
    pub fn rescore(
        &self,
        report: &Report,
        reference: &Snapshot,
        candidate: &Snapshot,
    ) -> VisdiffResult<CellScoreMap> {
        self.resolve(&report.differences, reference, candidate)
            .map(|(cells, _)| cells)
    }

    /// Candidate grid and the number of rows an export of `cells` should cover: the whole
    /// candidate document, extended to any touched cell below it.
    pub fn export_extent(&self, candidate: &Snapshot, cells: &CellScoreMap) -> (GridSpec, u32) {
        let grid = candidate.grid(&self.config.grid);
        let document_rows = candidate
            .viewport()
            .map_or(0, |v| grid.row_count(v.document_height()));
        (grid, document_rows.max(cells.rows_touched()))
    }

    fn resolve(
        &self,
        differences: &[DifferenceRecord],
        reference: &Snapshot,
        candidate: &Snapshot,
    ) -> VisdiffResult<(CellScoreMap, ScoringStats)> {
        let scoring = &self.config.scoring;
        let mut stats = ScoringStats::default();
        let mut magnitude_total = 0.0;

        let sorted = sort_for_resolution(differences, self.opts.order);
        let locator = SnapshotLocator::new(reference, candidate, &self.config.grid);
        let cells = resolve_cells(
            sorted,
            |record| {
                let magnitude = parse_magnitude(&record.differences);
                stats.scored += 1;
                if magnitude.has_magnitude() {
                    stats.with_magnitude += 1;
                    stats.max_magnitude = stats.max_magnitude.max(magnitude.max_magnitude);
                    magnitude_total += magnitude.max_magnitude;
                }
                score_difference(record, &magnitude, scoring)
            },
            &locator,
            &self.config.overrides,
        )?;
        if stats.with_magnitude > 0 {
            stats.avg_magnitude = magnitude_total / stats.with_magnitude as f64;
        }

        tracing::debug!(
            scored = stats.scored,
            with_magnitude = stats.with_magnitude,
            max_magnitude = stats.max_magnitude,
            avg_magnitude = stats.avg_magnitude,
            "magnitude-based scoring"
        );
        Ok((cells, stats))
    }
}

fn build_thread_pool(threads: Option<usize>) -> VisdiffResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| VisdiffError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/session/comparison.rs"]
mod tests;
