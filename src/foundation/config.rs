use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize as _;

use crate::foundation::core::{DifferenceKind, Severity};
use crate::foundation::error::{VisdiffError, VisdiffResult};

/// Complete engine configuration.
///
/// Every section falls back to its defaults, so a JSON file only needs to name the values it
/// overrides.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Logical grid geometry.
    pub grid: GridConfig,
    /// Difference classifier tolerances and compared properties.
    pub classifier: ClassifierConfig,
    /// Magnitude scorer constants.
    pub scoring: ScoringConfig,
    /// Cell score override arbitration.
    pub overrides: OverridePolicy,
}

impl EngineConfig {
    /// Parse a configuration from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> VisdiffResult<Self> {
        let cfg: EngineConfig = serde_json::from_reader(r)
            .map_err(|e| VisdiffError::serde(format!("parse engine config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> VisdiffResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            VisdiffError::validation(format!("open engine config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> VisdiffResult<()> {
        if self.grid.columns == 0 || self.grid.columns > 26 {
            return Err(VisdiffError::validation("grid.columns must be within 1..=26"));
        }
        if !(self.grid.row_height_px.is_finite() && self.grid.row_height_px > 0.0) {
            return Err(VisdiffError::validation("grid.rowHeightPx must be > 0"));
        }
        let fallback_width = self.grid.fallback_viewport_width;
        if !(fallback_width.is_finite() && fallback_width > 0.0) {
            return Err(VisdiffError::validation("grid.fallbackViewportWidth must be > 0"));
        }
        let classifier = &self.classifier;
        if classifier.position_tolerance_px < 0.0 || classifier.dimension_tolerance_px < 0.0 {
            return Err(VisdiffError::validation("classifier tolerances must be >= 0"));
        }
        for kind in ALL_KINDS {
            if self.scoring.tolerance.get(kind) < 0.0 {
                return Err(VisdiffError::validation(format!(
                    "scoring.tolerance for {kind} must be >= 0"
                )));
            }
            if self.scoring.ceiling.get(kind) <= 0.0 {
                return Err(VisdiffError::validation(format!(
                    "scoring.ceiling for {kind} must be > 0"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.overrides.protected_score) {
            return Err(VisdiffError::validation(
                "overrides.protectedScore must be within [0, 1]",
            ));
        }
        Ok(())
    }
}

const ALL_KINDS: [DifferenceKind; 7] = [
    DifferenceKind::CountMismatch,
    DifferenceKind::MissingReference,
    DifferenceKind::MissingCandidate,
    DifferenceKind::PositionMismatch,
    DifferenceKind::DimensionMismatch,
    DifferenceKind::VisualMismatch,
    DifferenceKind::TypographyMismatch,
];

/// Logical grid geometry.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridConfig {
    /// Number of lettered columns (`A..`).
    pub columns: u8,
    /// Fixed row height in document pixels.
    pub row_height_px: f64,
    /// Viewport width assumed when a snapshot carries no `_viewport`.
    pub fallback_viewport_width: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: 12,
            row_height_px: 100.0,
            fallback_viewport_width: 1280.0,
        }
    }
}

/// Classifier tolerances and the style properties it compares.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClassifierConfig {
    /// Absolute x/y deltas at or below this are ignored.
    pub position_tolerance_px: f64,
    /// Width/height deltas at or below this are ignored.
    pub dimension_tolerance_px: f64,
    /// Layout-affecting properties compared by exact string equality.
    pub visual_properties: Vec<String>,
    /// Font-related properties compared by exact string equality.
    pub typography_properties: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            position_tolerance_px: 5.0,
            dimension_tolerance_px: 5.0,
            visual_properties: strings(&[
                "width",
                "height",
                "maxWidth",
                "maxHeight",
                "margin",
                "padding",
                "display",
                "position",
                "textAlign",
            ]),
            typography_properties: strings(&[
                "fontFamily",
                "fontSize",
                "fontWeight",
                "lineHeight",
                "color",
            ]),
        }
    }
}

/// One value per difference category.
///
/// `structural` covers the count and missing-element kinds. Inside [`ScoringConfig`] a table may
/// name only some categories; the rest keep that table's defaults.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KindTable {
    /// `dimension_mismatch`.
    pub dimension: f64,
    /// `position_mismatch`.
    pub position: f64,
    /// `visual_mismatch`.
    pub visual: f64,
    /// `typography_mismatch`.
    pub typography: f64,
    /// `count_mismatch`, `missing_reference`, `missing_candidate`.
    pub structural: f64,
}

impl KindTable {
    fn patched(self, patch: KindTablePatch) -> Self {
        Self {
            dimension: patch.dimension.unwrap_or(self.dimension),
            position: patch.position.unwrap_or(self.position),
            visual: patch.visual.unwrap_or(self.visual),
            typography: patch.typography.unwrap_or(self.typography),
            structural: patch.structural.unwrap_or(self.structural),
        }
    }

    /// Value for `kind`.
    pub fn get(&self, kind: DifferenceKind) -> f64 {
        match kind {
            DifferenceKind::DimensionMismatch => self.dimension,
            DifferenceKind::PositionMismatch => self.position,
            DifferenceKind::VisualMismatch => self.visual,
            DifferenceKind::TypographyMismatch => self.typography,
            DifferenceKind::CountMismatch
            | DifferenceKind::MissingReference
            | DifferenceKind::MissingCandidate => self.structural,
        }
    }
}

/// One value per severity. Missing severities keep the owning table's defaults.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SeverityTable {
    /// `high`.
    pub high: f64,
    /// `medium`.
    pub medium: f64,
    /// `low`.
    pub low: f64,
}

impl SeverityTable {
    fn patched(self, patch: SeverityTablePatch) -> Self {
        Self {
            high: patch.high.unwrap_or(self.high),
            medium: patch.medium.unwrap_or(self.medium),
            low: patch.low.unwrap_or(self.low),
        }
    }

    /// Value for `severity`.
    pub fn get(&self, severity: Severity) -> f64 {
        match severity {
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }
}

/// Magnitude scorer constants.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoringConfig {
    /// Deltas below these floors are treated as rendering noise.
    #[serde(deserialize_with = "tolerance_table")]
    pub tolerance: KindTable,
    /// Adjusted magnitude at which linear scaling hands over to log compression.
    #[serde(deserialize_with = "ceiling_table")]
    pub ceiling: KindTable,
    /// How strongly each category depresses the base score.
    #[serde(deserialize_with = "weight_table")]
    pub weight: KindTable,
    /// Fraction of the base score a weight of `1.0` removes.
    pub weight_factor: f64,
    /// Multiplier applied per severity after weighting.
    #[serde(deserialize_with = "severity_multiplier_table")]
    pub severity_multiplier: SeverityTable,
    /// Property names whose presence marks a record as cosmetic.
    pub cosmetic_properties: Vec<String>,
    /// Selectors whose padding-related dimension/visual records are cosmetic.
    pub cosmetic_padding_selectors: Vec<String>,
    /// Score for a typography record that only differs in fallback fonts.
    pub font_fallback_score: f64,
    /// Score for a cosmetic record.
    pub cosmetic_score: f64,
    /// Score for a position record that only differs in grid placement.
    pub grid_only_score: f64,
    /// Score for a magnitude below half the tolerance floor.
    pub negligible_score: f64,
    /// Score for a magnitude below the tolerance floor.
    pub within_tolerance_score: f64,
    /// Severity-only scores used when no numeric delta parsed.
    #[serde(deserialize_with = "fallback_table")]
    pub fallback: SeverityTable,
    /// Medium typography/visual records without magnitude.
    pub fallback_style_medium: f64,
    /// As above, when the message hints at a sub-pixel-scale delta.
    pub fallback_style_subtle: f64,
    /// Paired pixel values closer than this count as a subtle hint.
    pub subtle_delta_px: f64,
}

const DEFAULT_TOLERANCE: KindTable = KindTable {
    dimension: 10.0,
    position: 5.0,
    visual: 5.0,
    typography: 2.0,
    structural: 5.0,
};

const DEFAULT_CEILING: KindTable = KindTable {
    dimension: 500.0,
    position: 200.0,
    visual: 100.0,
    typography: 50.0,
    structural: 100.0,
};

const DEFAULT_WEIGHT: KindTable = KindTable {
    dimension: 1.0,
    position: 0.8,
    visual: 0.5,
    typography: 0.3,
    structural: 0.9,
};

const DEFAULT_SEVERITY_MULTIPLIER: SeverityTable = SeverityTable {
    high: 0.7,
    medium: 0.9,
    low: 1.0,
};

const DEFAULT_FALLBACK: SeverityTable = SeverityTable {
    high: 0.3,
    medium: 0.7,
    low: 0.95,
};

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            ceiling: DEFAULT_CEILING,
            weight: DEFAULT_WEIGHT,
            weight_factor: 0.3,
            severity_multiplier: DEFAULT_SEVERITY_MULTIPLIER,
            cosmetic_properties: strings(&[
                "textAlign",
                "textTransform",
                "textDecoration",
                "display",
                "overflow",
                "visibility",
            ]),
            cosmetic_padding_selectors: strings(&["nav li"]),
            font_fallback_score: 0.98,
            cosmetic_score: 0.97,
            grid_only_score: 0.95,
            negligible_score: 0.98,
            within_tolerance_score: 0.95,
            fallback: DEFAULT_FALLBACK,
            fallback_style_medium: 0.95,
            fallback_style_subtle: 0.98,
            subtle_delta_px: 2.0,
        }
    }
}

#[derive(Default, serde::Deserialize)]
#[serde(default)]
struct KindTablePatch {
    dimension: Option<f64>,
    position: Option<f64>,
    visual: Option<f64>,
    typography: Option<f64>,
    structural: Option<f64>,
}

#[derive(Default, serde::Deserialize)]
#[serde(default)]
struct SeverityTablePatch {
    high: Option<f64>,
    medium: Option<f64>,
    low: Option<f64>,
}

fn tolerance_table<'de, D: serde::Deserializer<'de>>(d: D) -> Result<KindTable, D::Error> {
    KindTablePatch::deserialize(d).map(|p| DEFAULT_TOLERANCE.patched(p))
}

fn ceiling_table<'de, D: serde::Deserializer<'de>>(d: D) -> Result<KindTable, D::Error> {
    KindTablePatch::deserialize(d).map(|p| DEFAULT_CEILING.patched(p))
}

fn weight_table<'de, D: serde::Deserializer<'de>>(d: D) -> Result<KindTable, D::Error> {
    KindTablePatch::deserialize(d).map(|p| DEFAULT_WEIGHT.patched(p))
}

fn severity_multiplier_table<'de, D: serde::Deserializer<'de>>(
    d: D,
) -> Result<SeverityTable, D::Error> {
    SeverityTablePatch::deserialize(d).map(|p| DEFAULT_SEVERITY_MULTIPLIER.patched(p))
}

fn fallback_table<'de, D: serde::Deserializer<'de>>(d: D) -> Result<SeverityTable, D::Error> {
    SeverityTablePatch::deserialize(d).map(|p| DEFAULT_FALLBACK.patched(p))
}

/// Inclusive range of grid rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RowSpan {
    /// First row.
    pub start: u32,
    /// Last row (inclusive).
    pub end: u32,
}

impl RowSpan {
    /// `true` when `row` lies within the span.
    pub fn contains(self, row: u32) -> bool {
        self.start <= row && row <= self.end
    }
}

/// Lets a near-zero, less specific record break through high-score protection.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProtectionWaiver {
    /// Record kinds the waiver applies to.
    pub kinds: Vec<DifferenceKind>,
    /// Incoming scores strictly below this waive protection.
    pub score_below: f64,
    /// Rows where protection always holds.
    pub safe_rows: Option<RowSpan>,
}

impl Default for ProtectionWaiver {
    fn default() -> Self {
        Self {
            kinds: vec![DifferenceKind::DimensionMismatch],
            score_below: 0.1,
            safe_rows: None,
        }
    }
}

impl ProtectionWaiver {
    /// `true` when a record of `kind` scoring `score` may override a protected cell in `row`.
    pub fn waives(&self, kind: DifferenceKind, score: f64, row: u32) -> bool {
        self.kinds.contains(&kind)
            && score < self.score_below
            && !self.safe_rows.is_some_and(|rows| rows.contains(row))
    }
}

/// Cell score override arbitration between selectors of different specificity.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OverridePolicy {
    /// Existing scores at or above this are protected from less specific records.
    pub protected_score: f64,
    /// Protection only applies when the incoming score is worse by more than this.
    pub protection_gap: f64,
    /// Exception to protection; `None` disables it.
    pub waiver: Option<ProtectionWaiver>,
}

impl Default for OverridePolicy {
    fn default() -> Self {
        Self {
            protected_score: 0.95,
            protection_gap: 0.3,
            waiver: Some(ProtectionWaiver::default()),
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| (*s).to_string()).collect()
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
