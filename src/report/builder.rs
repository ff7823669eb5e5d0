use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::classify::record::DifferenceRecord;
use crate::foundation::core::Severity;
use crate::foundation::error::{VisdiffError, VisdiffResult};

/// Number of messages previewed per recommendation.
pub const RECOMMENDATION_EXAMPLES: usize = 5;

/// Aggregated result of one comparison run, as persisted for fix appliers and overlays.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// RFC 3339 UTC creation time.
    pub timestamp: String,
    /// Counts over `differences`.
    pub summary: ReportSummary,
    /// Every record, in classifier order.
    pub differences: Vec<DifferenceRecord>,
    /// `differences` grouped by selector, each group in classifier order.
    #[serde(default)]
    pub by_selector: BTreeMap<String, Vec<DifferenceRecord>>,
    /// Suggested next steps.
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
}

/// Totals over a report's differences.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    /// Length of the difference list.
    pub total_differences: usize,
    /// Count per `type` value.
    #[serde(default)]
    pub by_type: BTreeMap<String, usize>,
    /// Count per severity.
    #[serde(default)]
    pub by_severity: SeverityCounts,
}

/// Count per severity; every key is always present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SeverityCounts {
    /// `high` records.
    pub high: usize,
    /// `medium` records.
    pub medium: usize,
    /// `low` records.
    pub low: usize,
}

impl SeverityCounts {
    /// Count for `severity`.
    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }

    fn bump(&mut self, severity: Severity) {
        match severity {
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
        }
    }
}

/// One remediation hint.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Recommendation {
    /// Severity the hint addresses.
    pub priority: Severity,
    /// What to do.
    pub action: String,
    /// Records the hint covers.
    pub count: usize,
    /// Messages of the first few covered records.
    pub examples: Vec<String>,
}

/// Build a report stamped with the current time.
pub fn build_report(differences: Vec<DifferenceRecord>) -> Report {
    build_report_at(differences, OffsetDateTime::now_utc())
}

/// Build a report with a fixed timestamp.
pub fn build_report_at(differences: Vec<DifferenceRecord>, timestamp: OffsetDateTime) -> Report {
    let mut summary = ReportSummary {
        total_differences: differences.len(),
        ..ReportSummary::default()
    };
    let mut by_selector: BTreeMap<String, Vec<DifferenceRecord>> = BTreeMap::new();
    for d in &differences {
        *summary.by_type.entry(d.kind.as_str().to_string()).or_default() += 1;
        summary.by_severity.bump(d.severity);
        by_selector
            .entry(d.selector.clone())
            .or_default()
            .push(d.clone());
    }

    let high: Vec<&DifferenceRecord> = differences
        .iter()
        .filter(|d| d.severity == Severity::High)
        .collect();
    let mut recommendations = Vec::new();
    if !high.is_empty() {
        recommendations.push(Recommendation {
            priority: Severity::High,
            action: "Fix high-priority differences first".to_string(),
            count: high.len(),
            examples: high
                .iter()
                .take(RECOMMENDATION_EXAMPLES)
                .map(|d| d.message.clone())
                .collect(),
        });
    }

    Report {
        timestamp: format_timestamp(timestamp),
        summary,
        differences,
        by_selector,
        recommendations,
    }
}

/// `2025-03-04T05:06:07.000Z`: UTC, millisecond precision.
fn format_timestamp(timestamp: OffsetDateTime) -> String {
    let utc = timestamp.to_offset(UtcOffset::UTC);
    utc.format(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
    ))
    .unwrap_or_else(|_| utc.unix_timestamp().to_string())
}

impl Report {
    /// Parse a persisted report from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> VisdiffResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| VisdiffError::serde(format!("parse report JSON: {e}")))
    }

    /// Parse a persisted report from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> VisdiffResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            VisdiffError::validation(format!("open report '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// `true` when the run found no differences.
    pub fn is_clean(&self) -> bool {
        self.differences.is_empty()
    }

    /// Records ordered for a fix applier: high before medium before low, classifier order within.
    pub fn prioritized(&self) -> Vec<&DifferenceRecord> {
        let mut out: Vec<&DifferenceRecord> = self.differences.iter().collect();
        out.sort_by_key(|d| d.severity);
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/report/builder.rs"]
mod tests;
