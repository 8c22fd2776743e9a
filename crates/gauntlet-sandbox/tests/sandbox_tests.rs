use std::time::Duration;

use gauntlet_profile::{ArgTuple, Value};
use gauntlet_sandbox::{
    CallableRef, ExecOutcome, InProcessSandbox, Sandbox, SandboxConfig, SandboxFailure,
};

/// Helper: a sandbox knowing a divide that raises on b == 0.
fn make_divide_sandbox() -> InProcessSandbox {
    let mut sandbox = InProcessSandbox::new();
    sandbox.register("calculator::divide", |args| {
        let (Some(Value::Int(a)), Some(Value::Int(b))) = (args.get("a"), args.get("b")) else {
            return ExecOutcome::Raised {
                kind: "TypeError".to_string(),
            };
        };
        if *b == 0 {
            return ExecOutcome::Raised {
                kind: "ZeroDivisionError".to_string(),
            };
        }
        ExecOutcome::Returned(Value::Int(a / b))
    });
    sandbox
}

#[test]
fn test_execute_returns_value() {
    let sandbox = make_divide_sandbox();
    let args = ArgTuple::new()
        .with("a", Value::Int(10))
        .with("b", Value::Int(2));
    let outcome = sandbox
        .execute(
            &CallableRef::new("calculator::divide"),
            &args,
            Duration::from_millis(250),
        )
        .unwrap();
    assert_eq!(outcome, ExecOutcome::Returned(Value::Int(5)));
}

#[test]
fn test_execute_surfaces_raise() {
    let sandbox = make_divide_sandbox();
    let args = ArgTuple::new()
        .with("a", Value::Int(10))
        .with("b", Value::Int(0));
    let outcome = sandbox
        .execute(
            &CallableRef::new("calculator::divide"),
            &args,
            Duration::from_millis(250),
        )
        .unwrap();
    assert_eq!(
        outcome,
        ExecOutcome::Raised {
            kind: "ZeroDivisionError".to_string()
        }
    );
}

#[test]
fn test_unknown_callable_is_a_sandbox_failure() {
    let sandbox = make_divide_sandbox();
    let err = sandbox
        .execute(
            &CallableRef::new("calculator::missing"),
            &ArgTuple::new(),
            Duration::from_millis(250),
        )
        .unwrap_err();
    assert_eq!(
        err,
        SandboxFailure::UnknownCallable {
            name: "calculator::missing".to_string()
        }
    );
}

#[test]
fn test_oversized_arguments_exhaust_the_limit() {
    let mut sandbox = InProcessSandbox::with_config(SandboxConfig {
        time_limit: Duration::from_millis(250),
        max_arg_bytes: 64,
    });
    sandbox.register("m::echo", |_| ExecOutcome::Returned(Value::Null));
    let args = ArgTuple::new().with("payload", Value::Str("x".repeat(1024)));
    let err = sandbox
        .execute(&CallableRef::new("m::echo"), &args, Duration::from_millis(250))
        .unwrap_err();
    assert!(matches!(err, SandboxFailure::ResourceExhausted { .. }));
}

#[test]
fn test_overrunning_call_is_reclassified_as_timeout() {
    let mut sandbox = InProcessSandbox::new();
    sandbox.register("m::slow", |_| {
        std::thread::sleep(Duration::from_millis(30));
        ExecOutcome::Returned(Value::Null)
    });
    let outcome = sandbox
        .execute(
            &CallableRef::new("m::slow"),
            &ArgTuple::new(),
            Duration::from_millis(5),
        )
        .unwrap();
    assert_eq!(outcome, ExecOutcome::TimedOut);
}

#[test]
fn test_sandbox_is_shared_across_threads() {
    let sandbox = make_divide_sandbox();
    let callable = CallableRef::new("calculator::divide");
    std::thread::scope(|scope| {
        for denominator in [1i64, 2] {
            let sandbox = &sandbox;
            let callable = &callable;
            scope.spawn(move || {
                let args = ArgTuple::new()
                    .with("a", Value::Int(10))
                    .with("b", Value::Int(denominator));
                let outcome = sandbox
                    .execute(callable, &args, Duration::from_millis(250))
                    .unwrap();
                assert_eq!(outcome, ExecOutcome::Returned(Value::Int(10 / denominator)));
            });
        }
    });
}
