//! visdiff detects visual differences between two renderings of a page and scores them.
//!
//! The input is a pair of element snapshots (geometry plus computed style per selector), one
//! for the reference page and one for the candidate. The pipeline is pure and deterministic:
//!
//! - classify mismatches into [`DifferenceRecord`]s
//! - score each record from the magnitude of its deltas
//! - fold scores into a lettered grid of cells, arbitrating overlaps by selector specificity
//! - aggregate everything into a [`Report`]
//!
//! [`ComparisonSession`] runs the whole pipeline in one call.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod classify;
mod foundation;
mod grid;
mod report;
mod resolve;
mod score;
mod session;
mod snapshot;

pub use crate::foundation::config::{
    ClassifierConfig, EngineConfig, GridConfig, KindTable, OverridePolicy, ProtectionWaiver,
    RowSpan, ScoringConfig, SeverityTable,
};
pub use crate::foundation::core::{DifferenceKind, Geometry, Point, Rect, Severity, Viewport};
pub use crate::foundation::error::{VisdiffError, VisdiffResult};

pub use crate::classify::compare::classify_differences;
pub use crate::classify::record::DifferenceRecord;
pub use crate::grid::mapper::{CellCoord, CellRange, GridSpec, parse_range};
pub use crate::report::builder::{
    Recommendation, Report, ReportSummary, SeverityCounts, build_report, build_report_at,
};
pub use crate::report::tiers::{ScoreTier, tier_histogram};
pub use crate::report::verify::{Verification, verify_report};
pub use crate::resolve::cells::{
    CellLocator, CellScore, CellScoreMap, Incoming, SnapshotLocator, resolve_cells,
};
pub use crate::resolve::specificity::{
    RecordOrder, by_specificity, element_before_class, is_element_selector, resolution_order,
    sort_for_resolution, specificity,
};
pub use crate::score::magnitude::{MagnitudeSummary, parse_magnitude};
pub use crate::score::rules::{is_cosmetic, is_font_fallback, is_grid_only_position};
pub use crate::score::scorer::{MIN_SCORE, PERFECT_SCORE, score_difference, score_record};
pub use crate::session::comparison::{Comparison, ComparisonSession, ScoringStats, SessionOpts};
pub use crate::session::convergence::{
    ConvergenceTracker, IterationHistory, IterationRecord, LoopDecision,
};
pub use crate::session::fingerprint::{DiffFingerprint, fingerprint_differences};
pub use crate::snapshot::model::{ElementSnapshot, GridRange, Snapshot, VIEWPORT_KEY};
