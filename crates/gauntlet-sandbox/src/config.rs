use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Limits applied to every sandboxed execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxConfig {
    /// Wall-clock budget per call (default: 250 ms).
    pub time_limit: Duration,
    /// Maximum serialized argument size in bytes (default: 1 MiB).
    pub max_arg_bytes: u64,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_millis(250),
            max_arg_bytes: 1024 * 1024,
        }
    }
}
