//! The property campaign: budget split across worker streams, first
//! failure cancels the rest, the claimed failure gets shrunk once.

use std::sync::atomic::AtomicBool;
use std::thread;

use crossbeam::channel;

use gauntlet_profile::{Counterexample, FailureClass, FunctionSignature, GeneratedInput};
use gauntlet_sandbox::{CallableRef, Sandbox};

use crate::config::PropertyConfig;
use crate::shrink::shrink;
use crate::trial::{run_stream, StreamOutcome};

#[derive(Debug, Clone)]
pub struct PropertyReport {
    pub counterexample: Option<Counterexample>,
    pub trials_run: u64,
    pub inconclusive_trials: u64,
    pub workers_used: usize,
}

/// Run the full randomized campaign for one callable.
///
/// Each worker owns one stream, so a single-worker run is exactly
/// reproducible from the seed. With several workers the set of reported
/// failures can vary with scheduling; the claim rule (lowest stream id)
/// keeps the pick stable across runs that report the same set.
pub fn run_property(
    sandbox: &dyn Sandbox,
    callable: &CallableRef,
    signature: &FunctionSignature,
    config: &PropertyConfig,
) -> PropertyReport {
    let workers = config.workers.max(1);
    let cancel = AtomicBool::new(false);
    log::debug!(
        "property run on {callable}: {} trials across {workers} stream(s), seed {}",
        config.max_trials,
        config.seed
    );

    let mut outcomes: Vec<(u64, StreamOutcome)> = Vec::new();
    if workers == 1 {
        let outcome =
            run_stream(sandbox, callable, signature, config, 0, config.max_trials, &cancel);
        outcomes.push((0, outcome));
    } else {
        let (tx, rx) = channel::unbounded();
        thread::scope(|scope| {
            for stream in 0..workers as u64 {
                let tx = tx.clone();
                let cancel = &cancel;
                scope.spawn(move || {
                    let budget = stream_budget(config.max_trials, workers as u64, stream);
                    let outcome =
                        run_stream(sandbox, callable, signature, config, stream, budget, cancel);
                    let _ = tx.send((stream, outcome));
                });
            }
            drop(tx);
            // The iterator ends once every worker has dropped its sender,
            // so a panicking worker cannot hang the collection.
            for msg in rx {
                outcomes.push(msg);
            }
        });
    }

    let mut trials_run = 0;
    let mut inconclusive_trials = 0;
    let mut claimed: Option<(u64, GeneratedInput, FailureClass)> = None;
    for (stream, outcome) in outcomes {
        trials_run += outcome.trials_run;
        inconclusive_trials += outcome.inconclusive;
        if let Some((input, class)) = outcome.failure {
            let wins = claimed.as_ref().map_or(true, |(held, _, _)| stream < *held);
            if wins {
                claimed = Some((stream, input, class));
            }
        }
    }

    let counterexample = claimed.map(|(_, origin, failure)| {
        let shrunk = shrink(sandbox, callable, signature, &origin.args, &failure, config);
        log::info!(
            "{callable}: {failure} at {} minimized to {}",
            origin.args,
            shrunk.minimized
        );
        Counterexample {
            origin,
            minimized: shrunk.minimized,
            reductions: shrunk.reductions,
            failure,
            partial_shrink: shrunk.partial,
        }
    });

    PropertyReport {
        counterexample,
        trials_run,
        inconclusive_trials,
        workers_used: workers,
    }
}

/// Split `total` trials over `workers` streams; the remainder goes to the
/// lowest stream ids.
fn stream_budget(total: u64, workers: u64, stream: u64) -> u64 {
    let per = total / workers;
    let rem = total % workers;
    per + u64::from(stream < rem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::time::Duration;

    use gauntlet_profile::{ArgTuple, ParameterProfile, Value, ValueDomain};
    use gauntlet_sandbox::{ExecOutcome, SandboxFailure};

    struct PredicateSandbox<F>
    where
        F: Fn(&ArgTuple) -> bool + Send + Sync,
    {
        failing: F,
        kind: &'static str,
    }

    impl<F> Sandbox for PredicateSandbox<F>
    where
        F: Fn(&ArgTuple) -> bool + Send + Sync,
    {
        fn execute(
            &self,
            _callable: &CallableRef,
            args: &ArgTuple,
            _time_limit: Duration,
        ) -> Result<ExecOutcome, SandboxFailure> {
            if (self.failing)(args) {
                Ok(ExecOutcome::Raised {
                    kind: self.kind.to_string(),
                })
            } else {
                Ok(ExecOutcome::Returned(Value::Null))
            }
        }
    }

    fn single_int_signature(min: i64, max: i64) -> FunctionSignature {
        FunctionSignature {
            qualified_name: "m::f".into(),
            params: vec![ParameterProfile {
                name: "x".into(),
                hint: None,
                domain: ValueDomain::IntRange { min, max },
                observed: BTreeSet::new(),
                rejected: Vec::new(),
                roles: BTreeSet::new(),
            }],
            return_hint: None,
            error_conditions: BTreeSet::new(),
            relations: Vec::new(),
            complexity: 1,
            is_async: false,
        }
    }

    fn int_of(args: &ArgTuple, name: &str) -> i64 {
        match args.get(name) {
            Some(Value::Int(i)) => *i,
            other => panic!("expected int for {name}, got {other:?}"),
        }
    }

    #[test]
    fn test_default_seed_finds_and_minimizes_threshold_bug() {
        let sandbox = PredicateSandbox {
            failing: |args: &ArgTuple| int_of(args, "x") > 50,
            kind: "AssertionError",
        };
        let signature = single_int_signature(-100, 100);
        let report = run_property(
            &sandbox,
            &CallableRef::new("m::f"),
            &signature,
            &PropertyConfig::default(),
        );
        let cx = report.counterexample.expect("seeded run must hit the bug");
        assert_eq!(cx.minimized.get("x"), Some(&Value::Int(51)));
        assert!(!cx.partial_shrink);
        assert_eq!(cx.origin.seed, 42);
        assert_eq!(cx.origin.stream, 0);
        assert_eq!(
            cx.failure,
            FailureClass::RaisedUndeclared { kind: "AssertionError".into() }
        );
        assert!(int_of(&cx.origin.args, "x") > 50);
        assert!(report.trials_run >= 1);
        assert_eq!(report.workers_used, 1);
    }

    #[test]
    fn test_single_worker_campaign_is_reproducible() {
        let make_report = || {
            let sandbox = PredicateSandbox {
                failing: |args: &ArgTuple| int_of(args, "x") > 50,
                kind: "AssertionError",
            };
            let signature = single_int_signature(-100, 100);
            run_property(
                &sandbox,
                &CallableRef::new("m::f"),
                &signature,
                &PropertyConfig::default(),
            )
        };
        let a = make_report();
        let b = make_report();
        assert_eq!(a.trials_run, b.trials_run);
        assert_eq!(a.counterexample, b.counterexample);
    }

    #[test]
    fn test_clean_callable_consumes_the_whole_budget() {
        let sandbox = PredicateSandbox {
            failing: |_: &ArgTuple| false,
            kind: "unused",
        };
        let signature = single_int_signature(-100, 100);
        let config = PropertyConfig {
            max_trials: 200,
            ..PropertyConfig::default()
        };
        let report = run_property(&sandbox, &CallableRef::new("m::f"), &signature, &config);
        assert!(report.counterexample.is_none());
        assert_eq!(report.trials_run, 200);
        assert_eq!(report.inconclusive_trials, 0);
    }

    #[test]
    fn test_parallel_workers_still_minimize_exactly() {
        let sandbox = PredicateSandbox {
            failing: |args: &ArgTuple| int_of(args, "x") > 1000,
            kind: "AssertionError",
        };
        let signature = single_int_signature(i64::MIN, i64::MAX);
        let config = PropertyConfig {
            workers: 4,
            ..PropertyConfig::default()
        };
        let report = run_property(&sandbox, &CallableRef::new("m::f"), &signature, &config);
        assert_eq!(report.workers_used, 4);
        let cx = report.counterexample.expect("half the domain fails");
        // Whichever stream claims the failure, bisection lands on the
        // smallest failing value.
        assert_eq!(cx.minimized.get("x"), Some(&Value::Int(1001)));
    }

    #[test]
    fn test_zero_workers_behaves_as_one() {
        let sandbox = PredicateSandbox {
            failing: |_: &ArgTuple| false,
            kind: "unused",
        };
        let signature = single_int_signature(0, 10);
        let config = PropertyConfig {
            workers: 0,
            max_trials: 10,
            ..PropertyConfig::default()
        };
        let report = run_property(&sandbox, &CallableRef::new("m::f"), &signature, &config);
        assert_eq!(report.workers_used, 1);
        assert_eq!(report.trials_run, 10);
    }

    #[test]
    fn test_timeout_counterexample_carries_the_class() {
        struct SlowAboveSandbox;
        impl Sandbox for SlowAboveSandbox {
            fn execute(
                &self,
                _callable: &CallableRef,
                args: &ArgTuple,
                _time_limit: Duration,
            ) -> Result<ExecOutcome, SandboxFailure> {
                match args.get("x") {
                    Some(Value::Int(n)) if *n > 7 => Ok(ExecOutcome::TimedOut),
                    _ => Ok(ExecOutcome::Returned(Value::Null)),
                }
            }
        }
        let signature = single_int_signature(0, 100);
        let report = run_property(
            &SlowAboveSandbox,
            &CallableRef::new("m::f"),
            &signature,
            &PropertyConfig::default(),
        );
        let cx = report.counterexample.expect("most of the domain times out");
        assert_eq!(cx.failure, FailureClass::Timeout);
        assert_eq!(cx.minimized.get("x"), Some(&Value::Int(8)));
    }

    #[test]
    fn test_stream_budget_distributes_remainder_low_first() {
        assert_eq!(stream_budget(10, 4, 0), 3);
        assert_eq!(stream_budget(10, 4, 1), 3);
        assert_eq!(stream_budget(10, 4, 2), 2);
        assert_eq!(stream_budget(10, 4, 3), 2);
        let total: u64 = (0..4).map(|s| stream_budget(10, 4, s)).sum();
        assert_eq!(total, 10);
    }
}
