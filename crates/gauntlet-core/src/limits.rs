use serde::{Deserialize, Serialize};

/// Trials granted per point of cyclomatic complexity.
const TRIALS_PER_COMPLEXITY_POINT: u64 = 250;

/// Caps that keep one hostile unit from starving the rest of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisLimits {
    /// Callables analyzed per unit; the rest are skipped and reported.
    pub max_callables: usize,
    /// Boundary plus pattern cases kept per callable.
    pub max_cases_per_callable: usize,
    /// Ceiling on the complexity-scaled property budget.
    pub max_trials_per_callable: u64,
}

impl Default for AnalysisLimits {
    fn default() -> Self {
        Self {
            max_callables: 256,
            max_cases_per_callable: 512,
            max_trials_per_callable: 1000,
        }
    }
}

impl AnalysisLimits {
    /// Trial budget for one callable: branchier code earns more trials,
    /// up to the per-callable ceiling.
    pub fn trial_budget(&self, complexity: u32) -> u64 {
        let estimated = u64::from(complexity.max(1)).saturating_mul(TRIALS_PER_COMPLEXITY_POINT);
        estimated.min(self.max_trials_per_callable)
    }
}
