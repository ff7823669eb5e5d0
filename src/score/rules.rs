//! Exception rules that short-circuit magnitude scoring.

use crate::classify::record::DifferenceRecord;
use crate::foundation::config::ScoringConfig;
use crate::foundation::core::DifferenceKind;

/// A typography record whose deltas are all `fontFamily` changes that keep the primary font.
///
/// `"Inter", sans-serif` against `Inter, Helvetica, Arial` only differs in fallbacks.
pub fn is_font_fallback(record: &DifferenceRecord) -> bool {
    record.kind == DifferenceKind::TypographyMismatch
        && !record.differences.is_empty()
        && record.differences.iter().all(|d| {
            d.starts_with("fontFamily:")
                && matches!(
                    (primary_font(d, "Remote"), primary_font(d, "Local")),
                    (Some(r), Some(c)) if !r.is_empty() && r == c
                )
        })
}

/// A record touching a cosmetic property, or a padding change on a selector whose padding is
/// cosmetic.
///
/// Only the property name of each delta (the text before the first `:`) is inspected, so a value
/// such as `"Playfair Display"` never makes a record cosmetic.
pub fn is_cosmetic(record: &DifferenceRecord, config: &ScoringConfig) -> bool {
    let mut properties = record
        .differences
        .iter()
        .map(String::as_str)
        .filter_map(property_name);
    let touches_cosmetic = properties.clone().any(|p| {
        config
            .cosmetic_properties
            .iter()
            .any(|c| c.eq_ignore_ascii_case(p))
    });
    if touches_cosmetic {
        return true;
    }

    matches!(
        record.kind,
        DifferenceKind::DimensionMismatch | DifferenceKind::VisualMismatch
    ) && config
        .cosmetic_padding_selectors
        .iter()
        .any(|s| *s == record.selector)
        && (properties.any(|p| p.to_ascii_lowercase().contains("padding"))
            || record.message.to_ascii_lowercase().contains("padding"))
}

/// A position record that only moved between grid cells, with no pixel delta.
///
/// Usually a side effect of height drift further up the page.
pub fn is_grid_only_position(record: &DifferenceRecord) -> bool {
    record.kind == DifferenceKind::PositionMismatch
        && record
            .differences
            .iter()
            .any(|d| d.starts_with("Grid coordinates"))
        && !record
            .differences
            .iter()
            .any(|d| d.contains("(diff:") && d.contains("px"))
}

/// Property label of a delta description: `fontSize` in `fontSize: Remote "16px", ..`.
fn property_name(delta: &str) -> Option<&str> {
    delta.split_once(':').map(|(p, _)| p.trim())
}

/// First family of the quoted font list following `label`, without quotes.
fn primary_font<'a>(delta: &'a str, label: &str) -> Option<&'a str> {
    let start = delta.find(label)? + label.len();
    let rest = delta[start..].trim_start().strip_prefix('"')?;
    let primary = rest.split(',').next()?;
    Some(primary.trim().trim_matches(|c| c == '"' || c == '\''))
}

#[cfg(test)]
#[path = "../../tests/unit/score/rules.rs"]
mod tests;
