use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::config::GridConfig;
use crate::foundation::core::{Geometry, Viewport};
use crate::foundation::error::{VisdiffError, VisdiffResult};
use crate::grid::mapper::{CellRange, GridSpec};

/// Snapshot key holding viewport metadata rather than elements.
pub const VIEWPORT_KEY: &str = "_viewport";

/// Serialized grid placement of an element, as produced by the extractor.
///
/// Kept as text: the classifier compares `range` verbatim and the resolver parses it lazily, so
/// a malformed range only drops that record's cells instead of failing the snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridRange {
    /// Label of the top-left cell.
    pub top_left: String,
    /// Label of the bottom-right cell.
    pub bottom_right: String,
    /// `"<topLeft>-<bottomRight>"`.
    pub range: String,
}

impl GridRange {
    /// The `range` label, rebuilt from the corners when the extractor left it empty.
    pub fn label(&self) -> String {
        if self.range.is_empty() && !(self.top_left.is_empty() && self.bottom_right.is_empty()) {
            format!("{}-{}", self.top_left, self.bottom_right)
        } else {
            self.range.clone()
        }
    }
}

impl From<CellRange> for GridRange {
    fn from(r: CellRange) -> Self {
        Self {
            top_left: r.top_left.to_string(),
            bottom_right: r.bottom_right.to_string(),
            range: r.to_string(),
        }
    }
}

/// One observed element instance.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSnapshot {
    /// Logical selector plus a disambiguating ordinal (e.g. `nav li:nth-of-type(2)`).
    #[serde(default)]
    pub selector: String,
    /// Lowercase tag name, when the extractor reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
    /// `class` attribute, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// `id` attribute, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Absolute document-space box.
    #[serde(rename = "position", alias = "geometry")]
    pub geometry: Geometry,
    /// Grid placement; derived from `geometry` when absent.
    #[serde(
        default,
        rename = "gridCoordinates",
        alias = "gridRange",
        skip_serializing_if = "Option::is_none"
    )]
    pub grid_range: Option<GridRange>,
    /// Layout-affecting computed style.
    #[serde(default, rename = "visual", alias = "visualStyle")]
    pub visual_style: BTreeMap<String, String>,
    /// Font-related computed style.
    #[serde(default)]
    pub typography: BTreeMap<String, String>,
    /// Background color/image values.
    #[serde(default)]
    pub background: BTreeMap<String, String>,
}

impl ElementSnapshot {
    /// Element with a box and no style data.
    pub fn new(selector: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            selector: selector.into(),
            tag_name: None,
            class_name: None,
            id: None,
            geometry,
            grid_range: None,
            visual_style: BTreeMap::new(),
            typography: BTreeMap::new(),
            background: BTreeMap::new(),
        }
    }

    /// Builder: set a layout-affecting style property.
    pub fn with_visual(mut self, property: &str, value: impl Into<String>) -> Self {
        self.visual_style.insert(property.to_string(), value.into());
        self
    }

    /// Builder: set a font-related style property.
    pub fn with_typography(mut self, property: &str, value: impl Into<String>) -> Self {
        self.typography.insert(property.to_string(), value.into());
        self
    }

    /// Builder: set an explicit grid placement.
    pub fn with_grid_range(mut self, range: GridRange) -> Self {
        self.grid_range = Some(range);
        self
    }

    /// Grid placement, projecting `geometry` onto `grid` when none was captured.
    pub fn grid_range_or_project(&self, grid: &GridSpec) -> GridRange {
        self.grid_range
            .clone()
            .unwrap_or_else(|| grid.range_for(self.geometry.to_rect()).into())
    }
}

/// Element geometry and style for a fixed selector set at one point in time.
///
/// Selectors are kept sorted so every traversal is deterministic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    elements: BTreeMap<String, Vec<ElementSnapshot>>,
    viewport: Option<Viewport>,
}

impl Snapshot {
    /// Empty snapshot with optional viewport metadata.
    pub fn new(viewport: Option<Viewport>) -> Self {
        Self {
            elements: BTreeMap::new(),
            viewport,
        }
    }

    /// Parse and validate an extractor payload.
    ///
    /// The payload must be an object: `_viewport` holds viewport metadata, other `_`-prefixed keys
    /// are ignored, every remaining key maps a selector to an array of element records. Missing
    /// grid placements are derived from geometry.
    pub fn from_value(value: serde_json::Value, grid: &GridConfig) -> VisdiffResult<Self> {
        let serde_json::Value::Object(map) = value else {
            return Err(VisdiffError::validation(
                "snapshot must be a JSON object keyed by selector",
            ));
        };

        let mut errors = Vec::new();
        let mut snapshot = Snapshot::default();
        for (key, value) in map {
            if key == VIEWPORT_KEY {
                match serde_json::from_value::<Viewport>(value) {
                    Ok(v) => snapshot.viewport = Some(v),
                    Err(e) => errors.push(SnapshotError::at(&[PathElem::Key(&key)], e.to_string())),
                }
                continue;
            }
            if key.starts_with('_') {
                continue;
            }

            let serde_json::Value::Array(items) = value else {
                errors.push(SnapshotError::at(
                    &[PathElem::Key(&key)],
                    "selector entry must be an array of elements",
                ));
                continue;
            };

            let mut elements = Vec::with_capacity(items.len());
            for (idx, item) in items.into_iter().enumerate() {
                match serde_json::from_value::<ElementSnapshot>(item) {
                    Ok(mut el) => {
                        if el.selector.is_empty() {
                            el.selector = key.clone();
                        }
                        elements.push(el);
                    }
                    Err(e) => errors.push(SnapshotError::at(
                        &[PathElem::Key(&key), PathElem::Index(idx)],
                        e.to_string(),
                    )),
                }
            }
            snapshot.elements.insert(key, elements);
        }

        if !errors.is_empty() {
            return Err(VisdiffError::validation(format!(
                "invalid snapshot:\n{}",
                SnapshotErrors { errors }
            )));
        }

        snapshot.derive_grid_ranges(grid);
        Ok(snapshot)
    }

    /// Parse a snapshot from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R, grid: &GridConfig) -> VisdiffResult<Self> {
        let value: serde_json::Value = serde_json::from_reader(r)
            .map_err(|e| VisdiffError::serde(format!("parse snapshot JSON: {e}")))?;
        Self::from_value(value, grid)
    }

    /// Parse a snapshot from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>, grid: &GridConfig) -> VisdiffResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            VisdiffError::validation(format!("open snapshot '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f), grid)
    }

    /// Builder: set the element list for `selector`.
    pub fn with_elements(
        mut self,
        selector: impl Into<String>,
        elements: Vec<ElementSnapshot>,
    ) -> Self {
        self.elements.insert(selector.into(), elements);
        self
    }

    /// Fill in `grid_range` for every element that lacks one.
    pub fn derive_grid_ranges(&mut self, config: &GridConfig) {
        let grid = self.grid(config);
        for el in self.elements.values_mut().flatten() {
            if el.grid_range.is_none() {
                el.grid_range = Some(grid.range_for(el.geometry.to_rect()).into());
            }
        }
    }

    /// Elements captured for `selector`; empty when the selector is absent.
    pub fn elements(&self, selector: &str) -> &[ElementSnapshot] {
        self.elements
            .get(selector)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Element `index` of `selector`, if captured.
    pub fn element(&self, selector: &str, index: usize) -> Option<&ElementSnapshot> {
        self.elements(selector).get(index)
    }

    /// Captured selectors in sorted order.
    pub fn selectors(&self) -> impl Iterator<Item = &str> {
        self.elements.keys().map(String::as_str)
    }

    /// Viewport metadata, if captured.
    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    /// The logical grid for this snapshot's viewport.
    pub fn grid(&self, config: &GridConfig) -> GridSpec {
        GridSpec::for_viewport(config, self.viewport.as_ref())
    }

    /// Total number of captured elements.
    pub fn element_count(&self) -> usize {
        self.elements.values().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, Copy)]
enum PathElem<'a> {
    Key(&'a str),
    Index(usize),
}

#[derive(Debug, Clone)]
struct SnapshotError {
    path: String,
    message: String,
}

impl SnapshotError {
    fn at(path: &[PathElem<'_>], message: impl Into<String>) -> Self {
        Self {
            path: format_path(path),
            message: message.into(),
        }
    }
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

fn format_path(path: &[PathElem<'_>]) -> String {
    let mut s = String::from("$");
    for p in path {
        match *p {
            PathElem::Key(key) => {
                s.push_str("[\"");
                s.push_str(key);
                s.push_str("\"]");
            }
            PathElem::Index(i) => {
                s.push('[');
                s.push_str(&i.to_string());
                s.push(']');
            }
        }
    }
    s
}

#[derive(Debug, Clone)]
struct SnapshotErrors {
    errors: Vec<SnapshotError>,
}

impl fmt::Display for SnapshotErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/snapshot/model.rs"]
mod tests;
