use crate::report::builder::Report;
use crate::session::fingerprint::{DiffFingerprint, fingerprint_differences};

/// Verdict after one compare step of a compare → fix → compare loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopDecision {
    /// No differences left.
    Converged,
    /// The difference count dropped by less than the required minimum.
    NoImprovement,
    /// Exactly the same differences as the previous iteration.
    Stalled,
    /// Iteration budget spent.
    MaxIterations,
    /// Keep fixing.
    Continue,
}

impl LoopDecision {
    /// `true` for every decision except [`LoopDecision::Continue`].
    pub fn is_terminal(self) -> bool {
        self != LoopDecision::Continue
    }
}

/// One observed iteration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IterationRecord {
    /// 1-based iteration number.
    pub iteration: u32,
    /// Total differences reported.
    pub differences: usize,
    /// `high` differences.
    pub high: usize,
    /// `medium` differences.
    pub medium: usize,
    /// Previous count minus this count; absent on the first iteration.
    pub improvement: Option<i64>,
    /// Identity of the difference set.
    pub fingerprint: DiffFingerprint,
    /// What the tracker decided.
    pub decision: LoopDecision,
}

/// Persistable log of a loop.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IterationHistory {
    /// Iteration budget.
    pub max_iterations: u32,
    /// Required drop in difference count between iterations.
    pub min_improvement: i64,
    /// Observed iterations, oldest first.
    pub iterations: Vec<IterationRecord>,
}

impl IterationHistory {
    /// Decision of the latest iteration.
    pub fn final_decision(&self) -> Option<LoopDecision> {
        self.iterations.last().map(|r| r.decision)
    }
}

/// Decides when an iterative fix loop should stop.
#[derive(Clone, Debug)]
pub struct ConvergenceTracker {
    history: IterationHistory,
}

impl Default for ConvergenceTracker {
    fn default() -> Self {
        Self::new(100, 0)
    }
}

impl ConvergenceTracker {
    /// Tracker with an iteration budget and a minimum per-iteration improvement.
    pub fn new(max_iterations: u32, min_improvement: i64) -> Self {
        Self {
            history: IterationHistory {
                max_iterations: max_iterations.max(1),
                min_improvement,
                iterations: Vec::new(),
            },
        }
    }

    /// Record `report` as the next iteration and decide whether to go on.
    ///
    /// Once a terminal decision was made, further reports are ignored and that decision is
    /// returned again.
    pub fn observe(&mut self, report: &Report) -> LoopDecision {
        if let Some(done) = self.history.final_decision().filter(|d| d.is_terminal()) {
            return done;
        }

        let previous = self.history.iterations.last();
        let iteration = previous.map_or(1, |p| p.iteration + 1);
        let differences = report.differences.len();
        let fingerprint = fingerprint_differences(&report.differences);
        let improvement = previous.map(|p| p.differences as i64 - differences as i64);

        let decision = if differences == 0 {
            LoopDecision::Converged
        } else if improvement.is_some_and(|i| i < self.history.min_improvement) {
            LoopDecision::NoImprovement
        } else if previous.is_some_and(|p| p.fingerprint == fingerprint) {
            LoopDecision::Stalled
        } else if iteration >= self.history.max_iterations {
            LoopDecision::MaxIterations
        } else {
            LoopDecision::Continue
        };

        tracing::info!(
            iteration,
            differences,
            improvement = improvement.unwrap_or_default(),
            ?decision,
            "convergence step"
        );
        self.history.iterations.push(IterationRecord {
            iteration,
            differences,
            high: report.summary.by_severity.high,
            medium: report.summary.by_severity.medium,
            improvement,
            fingerprint,
            decision,
        });
        decision
    }

    /// Iterations observed so far.
    pub fn history(&self) -> &IterationHistory {
        &self.history
    }

    /// Consume the tracker, keeping its log.
    pub fn into_history(self) -> IterationHistory {
        self.history
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/convergence.rs"]
mod tests;
