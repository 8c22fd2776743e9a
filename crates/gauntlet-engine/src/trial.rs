//! A single trial: draw an argument tuple, execute it, classify the
//! outcome against the signature's declared error conditions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use gauntlet_profile::{FailureClass, FunctionSignature, GeneratedInput};
use gauntlet_sandbox::{CallableRef, ExecOutcome, Sandbox};

use crate::config::PropertyConfig;
use crate::generate::draw_args;
use crate::rng::trial_rng;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrialVerdict {
    Pass,
    Fail(FailureClass),
    /// The sandbox errored twice on the same input; the trial says
    /// nothing about the callable.
    Inconclusive,
}

/// Declared error kinds are expected behavior, not failures.
pub fn classify(outcome: &ExecOutcome, signature: &FunctionSignature) -> Option<FailureClass> {
    match outcome {
        ExecOutcome::Returned(_) => None,
        ExecOutcome::Raised { kind } if signature.declares_error(kind) => None,
        ExecOutcome::Raised { kind } => {
            Some(FailureClass::RaisedUndeclared { kind: kind.clone() })
        }
        ExecOutcome::TimedOut => Some(FailureClass::Timeout),
    }
}

/// Execute once, retrying a sandbox-side error a single time before
/// giving up on the trial.
pub fn execute_classified(
    sandbox: &dyn Sandbox,
    callable: &CallableRef,
    signature: &FunctionSignature,
    args: &gauntlet_profile::ArgTuple,
    time_limit: Duration,
) -> TrialVerdict {
    let outcome = match sandbox.execute(callable, args, time_limit) {
        Ok(outcome) => outcome,
        Err(first) => {
            log::debug!("sandbox error on {callable}, retrying: {first}");
            match sandbox.execute(callable, args, time_limit) {
                Ok(outcome) => outcome,
                Err(second) => {
                    log::warn!("sandbox failed twice on {callable}: {second}");
                    return TrialVerdict::Inconclusive;
                }
            }
        }
    };
    match classify(&outcome, signature) {
        Some(class) => TrialVerdict::Fail(class),
        None => TrialVerdict::Pass,
    }
}

/// What one stream produced. `failure` carries the raw failing draw with
/// its replay coordinates; shrinking happens later, once, on the claimed
/// failure.
#[derive(Debug, Clone)]
pub struct StreamOutcome {
    pub failure: Option<(GeneratedInput, FailureClass)>,
    pub trials_run: u64,
    pub inconclusive: u64,
}

/// Run up to `budget` trials on one stream. Stops at the first failure
/// (raising `cancel` for the other streams) or when another stream
/// cancels first. Inconclusive trials consume budget without stopping
/// the stream.
pub fn run_stream(
    sandbox: &dyn Sandbox,
    callable: &CallableRef,
    signature: &FunctionSignature,
    config: &PropertyConfig,
    stream: u64,
    budget: u64,
    cancel: &AtomicBool,
) -> StreamOutcome {
    let mut rng = trial_rng(config.seed, stream);
    let mut outcome = StreamOutcome {
        failure: None,
        trials_run: 0,
        inconclusive: 0,
    };
    for step in 0..budget {
        if cancel.load(Ordering::Relaxed) {
            break;
        }
        let args = draw_args(&mut rng, signature);
        outcome.trials_run += 1;
        match execute_classified(sandbox, callable, signature, &args, config.time_limit) {
            TrialVerdict::Pass => {}
            TrialVerdict::Inconclusive => outcome.inconclusive += 1,
            TrialVerdict::Fail(class) => {
                cancel.store(true, Ordering::Relaxed);
                let input = GeneratedInput {
                    args,
                    seed: config.seed,
                    stream,
                    step,
                };
                log::debug!(
                    "stream {stream} failed at step {step}: {class} on {}",
                    input.args
                );
                outcome.failure = Some((input, class));
                break;
            }
        }
    }
    outcome
}
