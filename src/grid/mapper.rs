use std::fmt;
use std::str::FromStr;

use crate::foundation::config::GridConfig;
use crate::foundation::core::{Point, Rect, Viewport};
use crate::foundation::error::{VisdiffError, VisdiffResult};

/// One cell of the logical grid, labelled `<Letter><Row>` (e.g. `C7`).
///
/// Ordering is row-major: all of row 0 left to right, then row 1, ...
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellCoord {
    /// 0-based row (`floor(y / row_height)`).
    pub row: u32,
    /// 0-based column; `0` is `A`.
    pub col: u8,
}

impl CellCoord {
    /// Construct a cell from its column and row.
    pub fn new(col: u8, row: u32) -> Self {
        Self { row, col }
    }

    /// Column letter (`A` for column 0).
    pub fn column_label(self) -> char {
        char::from(b'A' + self.col)
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column_label(), self.row)
    }
}

impl FromStr for CellCoord {
    type Err = VisdiffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        let letter = chars
            .next()
            .ok_or_else(|| VisdiffError::parse("empty grid cell label"))?;
        if !letter.is_ascii_uppercase() {
            return Err(VisdiffError::parse(format!(
                "grid cell '{s}' must start with a column letter A-Z"
            )));
        }
        let row = chars
            .as_str()
            .parse::<u32>()
            .map_err(|e| VisdiffError::parse(format!("grid cell '{s}' has invalid row: {e}")))?;
        Ok(Self::new(letter as u8 - b'A', row))
    }
}

impl serde::Serialize for CellCoord {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for CellCoord {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Rectangle of cells between two corners (inclusive), serialized as `"A0-B3"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellRange {
    /// Cell containing the box's top-left corner.
    pub top_left: CellCoord,
    /// Cell containing the box's bottom-right corner.
    pub bottom_right: CellCoord,
}

impl CellRange {
    /// Every cell inside the rectangle, row-major. Empty if the corners are inverted.
    pub fn cells(self) -> Vec<CellCoord> {
        let mut out = Vec::new();
        for row in self.top_left.row..=self.bottom_right.row {
            for col in self.top_left.col..=self.bottom_right.col {
                out.push(CellCoord::new(col, row));
            }
        }
        out
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.top_left, self.bottom_right)
    }
}

/// Expand a serialized range such as `"A0-L17"` into its cells.
///
/// A string without a `-` separator (or with an empty side) yields no cells; a side that is not a
/// valid cell label is an error.
pub fn parse_range(range: &str) -> VisdiffResult<Vec<CellCoord>> {
    let Some((start, end)) = range.split_once('-') else {
        return Ok(Vec::new());
    };
    if start.trim().is_empty() || end.trim().is_empty() {
        return Ok(Vec::new());
    }
    let range = CellRange {
        top_left: start.parse()?,
        bottom_right: end.parse()?,
    };
    Ok(range.cells())
}

/// Fixed logical grid overlaid on one rendered page.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridSpec {
    columns: u8,
    column_width: f64,
    row_height: f64,
}

impl GridSpec {
    /// Grid for a page rendered at `viewport_width`.
    ///
    /// Non-positive or non-finite widths fall back to `config.fallback_viewport_width`.
    pub fn new(config: &GridConfig, viewport_width: f64) -> Self {
        let width = if viewport_width.is_finite() && viewport_width > 0.0 {
            viewport_width
        } else {
            config.fallback_viewport_width
        };
        let columns = config.columns.max(1);
        Self {
            columns,
            column_width: width / f64::from(columns),
            row_height: config.row_height_px,
        }
    }

    /// Grid for a snapshot's viewport, if it has one.
    pub fn for_viewport(config: &GridConfig, viewport: Option<&Viewport>) -> Self {
        Self::new(config, viewport.map_or(0.0, |v| v.width))
    }

    /// Number of columns.
    pub fn columns(&self) -> u8 {
        self.columns
    }

    /// Width of one column in pixels.
    pub fn column_width(&self) -> f64 {
        self.column_width
    }

    /// Height of one row in pixels.
    pub fn row_height(&self) -> f64 {
        self.row_height
    }

    /// Cell containing `p`. Columns clamp to the last column; negative coordinates clamp to 0.
    pub fn cell_at(&self, p: Point) -> CellCoord {
        let col = (p.x / self.column_width).floor();
        let col = if col.is_finite() {
            col.clamp(0.0, f64::from(self.columns - 1)) as u8
        } else {
            0
        };
        let row = (p.y / self.row_height).floor();
        let row = if row.is_finite() && row > 0.0 {
            row.min(f64::from(u32::MAX)) as u32
        } else {
            0
        };
        CellCoord::new(col, row)
    }

    /// Cells spanned by a pixel box, from its top-left to its bottom-right corner.
    pub fn range_for(&self, rect: Rect) -> CellRange {
        CellRange {
            top_left: self.cell_at(Point::new(rect.x0, rect.y0)),
            bottom_right: self.cell_at(Point::new(rect.x1, rect.y1)),
        }
    }

    /// Rows needed to cover a document of `document_height` pixels.
    pub fn row_count(&self, document_height: f64) -> u32 {
        if !(document_height.is_finite() && document_height > 0.0) {
            return 0;
        }
        (document_height / self.row_height)
            .ceil()
            .min(f64::from(u32::MAX)) as u32
    }

    /// Every cell of a grid with `rows` rows, row-major.
    pub fn all_cells(&self, rows: u32) -> impl Iterator<Item = CellCoord> + '_ {
        (0..rows).flat_map(move |row| (0..self.columns).map(move |col| CellCoord::new(col, row)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/grid/mapper.rs"]
mod tests;
