//! The execution contract between analysis and whatever actually runs
//! the code under test.
//!
//! The core only needs three outcomes from a call: it returned, it raised
//! a named error, or it ran out of time. Everything else (a crashed
//! worker, an exhausted resource limit, a callable the sandbox has never
//! heard of) is the sandbox's own failure and says nothing about the
//! callable. `execute` takes `&self` so a pool of trial workers can share
//! one sandbox; implementations needing mutation use interior mutability.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use gauntlet_profile::{ArgTuple, Value};

use crate::config::SandboxConfig;

/// A reference to one callable the sandbox can run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallableRef {
    pub qualified_name: String,
}

impl CallableRef {
    pub fn new(qualified_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
        }
    }
}

impl std::fmt::Display for CallableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.qualified_name)
    }
}

/// What the callable did with the arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecOutcome {
    Returned(Value),
    Raised { kind: String },
    TimedOut,
}

/// The sandbox itself failed; the trial learned nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SandboxFailure {
    #[error("sandboxed execution crashed: {message}")]
    Crashed { message: String },

    #[error("resource limit hit: {what}")]
    ResourceExhausted { what: String },

    #[error("no callable registered for '{name}'")]
    UnknownCallable { name: String },
}

pub trait Sandbox: Send + Sync {
    fn execute(
        &self,
        callable: &CallableRef,
        args: &ArgTuple,
        time_limit: Duration,
    ) -> Result<ExecOutcome, SandboxFailure>;

    /// Whether the sandbox can run this callable at all. Orchestration
    /// skips property runs for unknown callables instead of burning the
    /// trial budget on `UnknownCallable` errors. Sandboxes that only find
    /// out by trying keep the default.
    fn knows(&self, _callable: &CallableRef) -> bool {
        true
    }
}

type Handler = Box<dyn Fn(&ArgTuple) -> ExecOutcome + Send + Sync>;

/// Reference sandbox running registered closures in-process.
///
/// Good enough for trials against model callables and for tests; it
/// cannot preempt a runaway call, so the time limit is checked around the
/// call and overruns are reclassified as `TimedOut` afterwards. Hardened
/// isolation belongs to an external runner behind the same trait.
pub struct InProcessSandbox {
    config: SandboxConfig,
    handlers: HashMap<String, Handler>,
}

impl InProcessSandbox {
    pub fn new() -> Self {
        Self::with_config(SandboxConfig::default())
    }

    pub fn with_config(config: SandboxConfig) -> Self {
        Self {
            config,
            handlers: HashMap::new(),
        }
    }

    /// Register the behavior for one qualified name.
    pub fn register<F>(&mut self, qualified_name: &str, handler: F)
    where
        F: Fn(&ArgTuple) -> ExecOutcome + Send + Sync + 'static,
    {
        self.handlers
            .insert(qualified_name.to_string(), Box::new(handler));
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }
}

impl Default for InProcessSandbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Sandbox for InProcessSandbox {
    fn knows(&self, callable: &CallableRef) -> bool {
        self.handlers.contains_key(&callable.qualified_name)
    }

    fn execute(
        &self,
        callable: &CallableRef,
        args: &ArgTuple,
        time_limit: Duration,
    ) -> Result<ExecOutcome, SandboxFailure> {
        let handler = self.handlers.get(&callable.qualified_name).ok_or_else(|| {
            SandboxFailure::UnknownCallable {
                name: callable.qualified_name.clone(),
            }
        })?;

        let arg_bytes = serde_json::to_vec(args)
            .map_err(|e| SandboxFailure::Crashed {
                message: format!("argument encoding failed: {e}"),
            })?
            .len() as u64;
        if arg_bytes > self.config.max_arg_bytes {
            return Err(SandboxFailure::ResourceExhausted {
                what: format!("arguments: {arg_bytes} bytes"),
            });
        }

        let start = Instant::now();
        let outcome = handler(args);
        if start.elapsed() > time_limit {
            return Ok(ExecOutcome::TimedOut);
        }
        Ok(outcome)
    }
}
