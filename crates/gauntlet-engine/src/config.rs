use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Budget and reproducibility knobs for one property run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyConfig {
    /// RNG seed; every candidate is replayable from it.
    pub seed: u64,
    /// Total trial budget across all workers.
    pub max_trials: u64,
    /// Trial worker threads; each gets its own stream.
    pub workers: usize,
    /// Wall-clock budget per sandboxed call.
    pub time_limit: Duration,
    /// Passes over the parameters before shrinking gives up.
    pub max_shrink_rounds: u32,
}

impl Default for PropertyConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_trials: 1000,
            workers: 1,
            time_limit: Duration::from_millis(250),
            max_shrink_rounds: 64,
        }
    }
}
