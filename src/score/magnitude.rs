use std::sync::OnceLock;

use regex::Regex;

/// Largest and average numeric delta parsed from one record's delta strings.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MagnitudeSummary {
    /// Largest absolute delta seen.
    pub max_magnitude: f64,
    /// Mean absolute delta; `0` when nothing parsed.
    pub avg_magnitude: f64,
    /// Number of deltas that contributed.
    pub sample_count: usize,
}

impl MagnitudeSummary {
    /// `true` when at least one non-zero delta parsed.
    pub fn has_magnitude(&self) -> bool {
        self.sample_count > 0 && self.max_magnitude > 0.0
    }

    fn push(&mut self, total: &mut f64, delta: f64) {
        let m = delta.abs();
        if !m.is_finite() {
            return;
        }
        self.max_magnitude = self.max_magnitude.max(m);
        *total += m;
        self.sample_count += 1;
    }
}

/// Extract numeric deltas from free-text delta descriptions.
///
/// Each description is matched against the recognized forms in priority order and the first
/// form that matches supplies its deltas:
///
/// 1. `(diff: Npx)`
/// 2. `(diff: N%)`
/// 3. `width|height|lineHeight|fontSize: Remote "Npx", Local "Mpx"`
/// 4. `margin|padding: Remote "a b c d", Local "e f g h"`, up to four components compared
///    positionally, each non-zero difference counted separately
///
/// Anything else is skipped.
pub fn parse_magnitude<S: AsRef<str>>(descriptions: &[S]) -> MagnitudeSummary {
    let mut summary = MagnitudeSummary::default();
    let mut total = 0.0;
    for d in descriptions {
        for delta in deltas_in(d.as_ref()) {
            summary.push(&mut total, delta);
        }
    }
    if summary.sample_count > 0 {
        summary.avg_magnitude = total / summary.sample_count as f64;
    }
    summary
}

fn deltas_in(text: &str) -> Vec<f64> {
    if let Some(v) = capture_number(re_diff_px(), text) {
        return vec![v];
    }
    if let Some(v) = capture_number(re_diff_percent(), text) {
        return vec![v];
    }
    if let Some(caps) = re_paired_px().captures(text) {
        let r = caps.get(1).and_then(|m| m.as_str().parse::<f64>().ok());
        let c = caps.get(2).and_then(|m| m.as_str().parse::<f64>().ok());
        return match (r, c) {
            (Some(r), Some(c)) if r != c => vec![r - c],
            _ => Vec::new(),
        };
    }
    if let Some(caps) = re_box().captures(text) {
        let r = box_components(caps.get(1).map_or("", |m| m.as_str()));
        let c = box_components(caps.get(2).map_or("", |m| m.as_str()));
        return (0..r.len().max(c.len()))
            .map(|i| r.get(i).copied().unwrap_or(0.0) - c.get(i).copied().unwrap_or(0.0))
            .filter(|d| *d != 0.0)
            .collect();
    }
    Vec::new()
}

fn capture_number(re: &Regex, text: &str) -> Option<f64> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

/// Leading numeric value of each whitespace-separated component; non-numeric components are `0`.
fn box_components(value: &str) -> Vec<f64> {
    value
        .split_whitespace()
        .take(4)
        .map(|part| {
            re_leading_number()
                .find(part)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0.0)
        })
        .collect()
}

fn re_diff_px() -> &'static Regex {
    static ONCE: OnceLock<Regex> = OnceLock::new();
    ONCE.get_or_init(|| Regex::new(r"(?i)\(diff:\s*(-?\d+(?:\.\d+)?)px\)").expect("valid regex"))
}

fn re_diff_percent() -> &'static Regex {
    static ONCE: OnceLock<Regex> = OnceLock::new();
    ONCE.get_or_init(|| Regex::new(r"(?i)\(diff:\s*(-?\d+(?:\.\d+)?)%\)").expect("valid regex"))
}

fn re_paired_px() -> &'static Regex {
    static ONCE: OnceLock<Regex> = OnceLock::new();
    ONCE.get_or_init(|| {
        Regex::new(concat!(
            r#"(?i)(?:width|height|lineHeight|fontSize):\s*"#,
            r#"Remote\s*"(\d+(?:\.\d+)?)px",\s*Local\s*"(\d+(?:\.\d+)?)px""#,
        ))
        .expect("valid regex")
    })
}

fn re_box() -> &'static Regex {
    static ONCE: OnceLock<Regex> = OnceLock::new();
    ONCE.get_or_init(|| {
        Regex::new(r#"(?i)(?:margin|padding):\s*Remote\s*"([^"]*)",\s*Local\s*"([^"]*)""#)
            .expect("valid regex")
    })
}

fn re_leading_number() -> &'static Regex {
    static ONCE: OnceLock<Regex> = OnceLock::new();
    ONCE.get_or_init(|| Regex::new(r"^[-+]?(?:\d+(?:\.\d*)?|\.\d+)").expect("valid regex"))
}

#[cfg(test)]
#[path = "../../tests/unit/score/magnitude.rs"]
mod tests;
