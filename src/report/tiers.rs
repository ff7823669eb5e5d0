use std::fmt;

/// Colour band of a cell score in the visualization overlay.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTier {
    /// `>= 0.95`
    Excellent,
    /// `>= 0.85`
    VeryGood,
    /// `>= 0.75`
    Good,
    /// `>= 0.65`
    Minor,
    /// `>= 0.50`
    Moderate,
    /// `>= 0.35`
    Significant,
    /// `>= 0.20`
    Major,
    /// Everything below.
    Critical,
}

impl ScoreTier {
    /// Best to worst.
    pub const ALL: [ScoreTier; 8] = [
        ScoreTier::Excellent,
        ScoreTier::VeryGood,
        ScoreTier::Good,
        ScoreTier::Minor,
        ScoreTier::Moderate,
        ScoreTier::Significant,
        ScoreTier::Major,
        ScoreTier::Critical,
    ];

    /// Band containing `score`. NaN lands in `Critical`.
    pub fn from_score(score: f64) -> Self {
        Self::ALL
            .into_iter()
            .find(|tier| score >= tier.min_score())
            .unwrap_or(ScoreTier::Critical)
    }

    /// Lowest score inside the band.
    pub fn min_score(self) -> f64 {
        match self {
            ScoreTier::Excellent => 0.95,
            ScoreTier::VeryGood => 0.85,
            ScoreTier::Good => 0.75,
            ScoreTier::Minor => 0.65,
            ScoreTier::Moderate => 0.50,
            ScoreTier::Significant => 0.35,
            ScoreTier::Major => 0.20,
            ScoreTier::Critical => f64::NEG_INFINITY,
        }
    }

    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            ScoreTier::Excellent => "excellent",
            ScoreTier::VeryGood => "very_good",
            ScoreTier::Good => "good",
            ScoreTier::Minor => "minor",
            ScoreTier::Moderate => "moderate",
            ScoreTier::Significant => "significant",
            ScoreTier::Major => "major",
            ScoreTier::Critical => "critical",
        }
    }
}

impl fmt::Display for ScoreTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of scores per tier, best tier first, every tier present.
pub fn tier_histogram(scores: impl IntoIterator<Item = f64>) -> Vec<(ScoreTier, usize)> {
    let mut counts = [0usize; ScoreTier::ALL.len()];
    for score in scores {
        counts[ScoreTier::from_score(score) as usize] += 1;
    }
    ScoreTier::ALL.into_iter().zip(counts).collect()
}

#[cfg(test)]
#[path = "../../tests/unit/report/tiers.rs"]
mod tests;
