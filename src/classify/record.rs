use crate::foundation::core::{DifferenceKind, Severity};
use crate::snapshot::model::GridRange;

/// One detected mismatch between the reference and the candidate.
///
/// `differences` holds the property-level delta strings (`Width: Remote 1296px, Local 800px
/// (diff: 496px)`); `Remote` names the reference side and `Local` the candidate side.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifferenceRecord {
    /// Mismatch category.
    #[serde(rename = "type")]
    pub kind: DifferenceKind,
    /// Logical selector the record belongs to.
    pub selector: String,
    /// Element index within the selector; absent for count mismatches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// Reference-side grid placement (paired kinds only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_range: Option<GridRange>,
    /// Candidate-side grid placement (paired kinds only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_range: Option<GridRange>,
    /// Reference element count (count mismatches only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_count: Option<usize>,
    /// Candidate element count (count mismatches only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_count: Option<usize>,
    /// Ordered property-level delta descriptions.
    #[serde(default)]
    pub differences: Vec<String>,
    /// Priority assigned at classification time.
    pub severity: Severity,
    /// One-line human-readable summary.
    pub message: String,
}

impl DifferenceRecord {
    /// Record with no ranges, counts or deltas.
    pub fn new(
        kind: DifferenceKind,
        selector: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            selector: selector.into(),
            index: None,
            reference_range: None,
            candidate_range: None,
            reference_count: None,
            candidate_count: None,
            differences: Vec::new(),
            severity,
            message: message.into(),
        }
    }

    /// Builder: set the element index.
    pub fn at_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Builder: set both grid placements.
    pub fn with_ranges(mut self, reference: GridRange, candidate: GridRange) -> Self {
        self.reference_range = Some(reference);
        self.candidate_range = Some(candidate);
        self
    }

    /// Builder: set the delta descriptions.
    pub fn with_differences(mut self, differences: Vec<String>) -> Self {
        self.differences = differences;
        self
    }

    /// `selector[index]`, or the bare selector when there is no index.
    pub fn target(&self) -> String {
        match self.index {
            Some(i) => format!("{}[{i}]", self.selector),
            None => self.selector.clone(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/classify/record.rs"]
mod tests;
