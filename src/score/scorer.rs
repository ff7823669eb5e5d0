use std::sync::OnceLock;

use regex::Regex;

use crate::classify::record::DifferenceRecord;
use crate::foundation::config::ScoringConfig;
use crate::foundation::core::{DifferenceKind, Severity};
use crate::score::magnitude::{MagnitudeSummary, parse_magnitude};
use crate::score::rules::{is_cosmetic, is_font_fallback, is_grid_only_position};

/// Lowest score any record can produce.
pub const MIN_SCORE: f64 = 0.01;
/// Score of a cell nothing has touched.
pub const PERFECT_SCORE: f64 = 1.0;

/// Parse `record`'s deltas and score it.
pub fn score_record(record: &DifferenceRecord, config: &ScoringConfig) -> f64 {
    score_difference(record, &parse_magnitude(&record.differences), config)
}

/// Confidence that the region covered by `record` already matches, in `[0.01, 1.0]`.
///
/// Rules are tried in order and the first hit wins: font fallback, cosmetic, grid-only
/// position, then magnitude scoring when a non-zero delta parsed, else severity alone.
pub fn score_difference(
    record: &DifferenceRecord,
    magnitude: &MagnitudeSummary,
    config: &ScoringConfig,
) -> f64 {
    let score = if let Some(score) = exception_score(record, config) {
        score
    } else if magnitude.has_magnitude() {
        magnitude_score(record, magnitude.max_magnitude, config)
    } else {
        fallback_score(record, config)
    };
    score.clamp(MIN_SCORE, PERFECT_SCORE)
}

fn exception_score(record: &DifferenceRecord, config: &ScoringConfig) -> Option<f64> {
    if is_font_fallback(record) {
        Some(config.font_fallback_score)
    } else if is_cosmetic(record, config) {
        Some(config.cosmetic_score)
    } else if is_grid_only_position(record) {
        Some(config.grid_only_score)
    } else {
        None
    }
}

fn magnitude_score(record: &DifferenceRecord, max: f64, config: &ScoringConfig) -> f64 {
    let tolerance = config.tolerance.get(record.kind);
    if max < tolerance {
        return if max < tolerance * 0.5 {
            config.negligible_score
        } else {
            config.within_tolerance_score
        };
    }

    let ceiling = config.ceiling.get(record.kind);
    let adjusted = max - tolerance;
    let normalized = if adjusted <= ceiling {
        adjusted.max(0.0) / ceiling
    } else {
        let excess = adjusted / ceiling;
        (0.9 + 0.1 * (1.0 - 1.0 / (1.0 + excess.log10()))).min(0.99)
    };

    let weight = config.weight.get(record.kind);
    let weighted = (1.0 - normalized) * (1.0 - weight * config.weight_factor);
    weighted * config.severity_multiplier.get(record.severity)
}

fn fallback_score(record: &DifferenceRecord, config: &ScoringConfig) -> f64 {
    match record.severity {
        Severity::High => config.fallback.high,
        Severity::Medium => match record.kind {
            DifferenceKind::TypographyMismatch | DifferenceKind::VisualMismatch => {
                if has_subtle_hint(record, config.subtle_delta_px) {
                    config.fallback_style_subtle
                } else {
                    config.fallback_style_medium
                }
            }
            _ => config.fallback.medium,
        },
        Severity::Low => config.fallback.low,
    }
}

/// Two neighbouring pixel values within one delta closer than `threshold`.
///
/// Values are only paired inside the same delta description; the message is used as a single
/// description when the record carries none.
fn has_subtle_hint(record: &DifferenceRecord, threshold: f64) -> bool {
    let within = |text: &str| {
        let values: Vec<f64> = re_px_value()
            .captures_iter(text)
            .filter_map(|c| c.get(1)?.as_str().parse().ok())
            .collect();
        values.windows(2).any(|w| (w[0] - w[1]).abs() < threshold)
    };
    if record.differences.is_empty() {
        within(&record.message)
    } else {
        record.differences.iter().any(|d| within(d))
    }
}

fn re_px_value() -> &'static Regex {
    static ONCE: OnceLock<Regex> = OnceLock::new();
    ONCE.get_or_init(|| Regex::new(r"(-?\d+(?:\.\d+)?)px").expect("valid regex"))
}

#[cfg(test)]
#[path = "../../tests/unit/score/scorer.rs"]
mod tests;
