use std::fmt;

pub use kurbo::{Point, Rect};

/// Classifier-assigned priority of a difference.
///
/// Ordering follows remediation priority: `High < Medium < Low`, so an ascending sort puts the
/// records a fix applier must handle first at the front.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Layout-breaking or structural.
    High,
    /// Visible but local.
    Medium,
    /// Negligible.
    Low,
}

impl Severity {
    /// All severities in priority order.
    pub const ALL: [Severity; 3] = [Severity::High, Severity::Medium, Severity::Low];

    /// Stable lowercase name used in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a detected mismatch.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DifferenceKind {
    /// The two snapshots hold a different number of elements for a selector.
    CountMismatch,
    /// An element exists only in the candidate.
    MissingReference,
    /// An element exists only in the reference.
    MissingCandidate,
    /// Absolute position or grid placement differs.
    PositionMismatch,
    /// Rendered width/height differs.
    DimensionMismatch,
    /// Layout-affecting computed style differs.
    VisualMismatch,
    /// Font-related computed style differs.
    TypographyMismatch,
}

impl DifferenceKind {
    /// Stable snake_case name used in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            DifferenceKind::CountMismatch => "count_mismatch",
            DifferenceKind::MissingReference => "missing_reference",
            DifferenceKind::MissingCandidate => "missing_candidate",
            DifferenceKind::PositionMismatch => "position_mismatch",
            DifferenceKind::DimensionMismatch => "dimension_mismatch",
            DifferenceKind::VisualMismatch => "visual_mismatch",
            DifferenceKind::TypographyMismatch => "typography_mismatch",
        }
    }

    /// `true` for kinds produced from an index-aligned reference/candidate pair.
    pub fn is_paired(self) -> bool {
        matches!(
            self,
            DifferenceKind::PositionMismatch
                | DifferenceKind::DimensionMismatch
                | DifferenceKind::VisualMismatch
                | DifferenceKind::TypographyMismatch
        )
    }
}

impl fmt::Display for DifferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Absolute, scroll-adjusted element box in document pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Geometry {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Border-box width.
    pub width: f64,
    /// Border-box height.
    pub height: f64,
}

impl Geometry {
    /// Construct a box from its top-left corner and size.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The box as a [`Rect`] (`x0/y0` top-left, `x1/y1` bottom-right).
    pub fn to_rect(self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// `true` when every coordinate is finite.
    pub fn is_finite(self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }
}

/// Viewport and document metadata captured alongside a snapshot.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    /// Inner viewport width; the grid's columns divide this width.
    pub width: f64,
    /// Inner viewport height.
    pub height: f64,
    /// Full document width.
    #[serde(default)]
    pub scroll_width: f64,
    /// Full document height.
    #[serde(default)]
    pub scroll_height: f64,
}

impl Viewport {
    /// Height of the whole document, never smaller than the viewport itself.
    pub fn document_height(self) -> f64 {
        self.scroll_height.max(self.height)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
