//! Selector specificity and the order records are folded into the cell table.
//!
//! Specificity here is a count of descendant steps, not the CSS cascade model: `nav` is 0,
//! `nav li` is 1, `main section .card` is 2.

use std::cmp::Ordering;

use crate::classify::record::DifferenceRecord;

/// Comparator deciding the fold order of difference records.
pub type RecordOrder = fn(&DifferenceRecord, &DifferenceRecord) -> Ordering;

/// Number of whitespace-separated compound parts, minus one.
pub fn specificity(selector: &str) -> usize {
    selector.split_whitespace().count().saturating_sub(1)
}

/// `true` for selectors that start with a tag name (`nav`, `h2.title`), not a class or id.
pub fn is_element_selector(selector: &str) -> bool {
    selector.starts_with(|c: char| c.is_ascii_lowercase())
}

/// Less specific selectors first.
pub fn by_specificity(a: &DifferenceRecord, b: &DifferenceRecord) -> Ordering {
    specificity(&a.selector).cmp(&specificity(&b.selector))
}

/// Element selectors before class/id selectors; a heuristic tiebreak, not CSS specificity.
pub fn element_before_class(a: &DifferenceRecord, b: &DifferenceRecord) -> Ordering {
    is_element_selector(&b.selector).cmp(&is_element_selector(&a.selector))
}

/// Default fold order: [`by_specificity`], then [`element_before_class`].
pub fn resolution_order(a: &DifferenceRecord, b: &DifferenceRecord) -> Ordering {
    by_specificity(a, b).then_with(|| element_before_class(a, b))
}

/// Records in fold order. The sort is stable, so ties keep classifier order.
pub fn sort_for_resolution<F>(records: &[DifferenceRecord], mut order: F) -> Vec<&DifferenceRecord>
where
    F: FnMut(&DifferenceRecord, &DifferenceRecord) -> Ordering,
{
    let mut sorted: Vec<&DifferenceRecord> = records.iter().collect();
    sorted.sort_by(|a, b| order(a, b));
    sorted
}

#[cfg(test)]
#[path = "../../tests/unit/resolve/specificity.rs"]
mod tests;
