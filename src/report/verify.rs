use std::collections::BTreeMap;

use crate::foundation::core::Severity;
use crate::report::builder::Report;

/// Outcome of [`verify_report`].
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Verification {
    /// `true` when `errors` is empty.
    pub passed: bool,
    /// Structural inconsistencies.
    pub errors: Vec<String>,
    /// Findings that do not invalidate the report.
    pub warnings: Vec<String>,
}

/// Check that a report's summary and grouping agree with its difference list.
///
/// High-severity differences are reported as a warning, not an error: the report is still
/// well-formed.
pub fn verify_report(report: &Report) -> Verification {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let summary = &report.summary;

    if summary.total_differences != report.differences.len() {
        errors.push(format!(
            "summary.totalDifferences is {} but the report lists {} differences",
            summary.total_differences,
            report.differences.len()
        ));
    }

    let mut by_type: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_selector: BTreeMap<&str, usize> = BTreeMap::new();
    for d in &report.differences {
        *by_type.entry(d.kind.as_str().to_string()).or_default() += 1;
        *by_selector.entry(&d.selector).or_default() += 1;
    }
    if by_type != summary.by_type {
        errors.push(format!(
            "summary.byType {:?} does not match the difference list {:?}",
            summary.by_type, by_type
        ));
    }

    for severity in Severity::ALL {
        let actual = report
            .differences
            .iter()
            .filter(|d| d.severity == severity)
            .count();
        let claimed = summary.by_severity.get(severity);
        if actual != claimed {
            errors.push(format!(
                "summary.bySeverity.{severity} is {claimed} but {actual} differences are {severity}"
            ));
        }
    }

    let grouped: BTreeMap<&str, usize> = report
        .by_selector
        .iter()
        .map(|(sel, records)| (sel.as_str(), records.len()))
        .collect();
    if grouped != by_selector {
        errors.push("bySelector does not group the difference list".to_string());
    }
    for (sel, records) in &report.by_selector {
        if let Some(stray) = records.iter().find(|r| r.selector != *sel) {
            errors.push(format!(
                "bySelector[\"{sel}\"] holds a record for '{}'",
                stray.selector
            ));
        }
    }

    if summary.by_severity.high > 0 {
        warnings.push(format!(
            "{} high-priority visual differences detected",
            summary.by_severity.high
        ));
    }

    Verification {
        passed: errors.is_empty(),
        errors,
        warnings,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/report/verify.rs"]
mod tests;
