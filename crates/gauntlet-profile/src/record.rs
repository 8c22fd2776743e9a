//! The artifacts analysis produces: edge cases, generated inputs,
//! shrunk counterexamples and the test-case records emitters consume.

use serde::{Deserialize, Serialize};

use crate::value::{ArgTuple, Value};

/// A deterministic boundary or adversarial input with the reason it was
/// chosen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeCase {
    pub args: ArgTuple,
    pub tag: String,
}

impl EdgeCase {
    pub fn new(args: ArgTuple, tag: impl Into<String>) -> Self {
        Self { args, tag: tag.into() }
    }
}

/// A randomized input together with the coordinates to replay the exact
/// draw: seed, stream and step within the stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedInput {
    pub args: ArgTuple,
    pub seed: u64,
    pub stream: u64,
    pub step: u64,
}

/// One accepted reduction during shrinking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReductionStep {
    pub param: String,
    pub from: Value,
    pub to: Value,
}

impl std::fmt::Display for ReductionStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} -> {}", self.param, self.from, self.to)
    }
}

/// Why a trial counts as failed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FailureClass {
    /// Raised an error kind the signature does not declare.
    RaisedUndeclared { kind: String },
    Timeout,
    /// The sandbox itself failed twice on this trial; nothing is known
    /// about the callable.
    Inconclusive,
}

impl std::fmt::Display for FailureClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureClass::RaisedUndeclared { kind } => write!(f, "raised {kind}"),
            FailureClass::Timeout => write!(f, "timeout"),
            FailureClass::Inconclusive => write!(f, "inconclusive"),
        }
    }
}

/// A failing input after minimization. `origin` replays the untouched
/// draw; `reductions` is the accepted shrink chain in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counterexample {
    pub origin: GeneratedInput,
    pub minimized: ArgTuple,
    pub reductions: Vec<ReductionStep>,
    pub failure: FailureClass,
    /// Shrinking hit its round budget before reaching a fixed point.
    pub partial_shrink: bool,
}

/// What a test built from a record should expect the callable to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExpectedClass {
    /// Returns normally or raises only declared error kinds.
    Nominal,
    /// Hits a declared error path on purpose.
    DeclaredError { kind: String },
    /// Reproduces an observed failure.
    FailureWitness { class: FailureClass },
}

/// Where a record came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Provenance {
    Boundary { tag: String },
    Pattern { name: String },
    Property {
        seed: u64,
        stream: u64,
        step: u64,
        reductions: u32,
        partial: bool,
    },
}

/// The sole artifact that crosses to test emitters. Plain data; the core
/// assigns it no further lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCaseRecord {
    pub inputs: ArgTuple,
    pub expected: ExpectedClass,
    pub provenance: Provenance,
}

impl TestCaseRecord {
    pub fn from_edge_case(case: &EdgeCase, expected: ExpectedClass) -> Self {
        Self {
            inputs: case.args.clone(),
            expected,
            provenance: Provenance::Boundary { tag: case.tag.clone() },
        }
    }

    pub fn from_pattern_case(case: &EdgeCase, pattern: &str, expected: ExpectedClass) -> Self {
        Self {
            inputs: case.args.clone(),
            expected,
            provenance: Provenance::Pattern {
                name: pattern.to_string(),
            },
        }
    }

    pub fn from_counterexample(cx: &Counterexample) -> Self {
        Self {
            inputs: cx.minimized.clone(),
            expected: ExpectedClass::FailureWitness {
                class: cx.failure.clone(),
            },
            provenance: Provenance::Property {
                seed: cx.origin.seed,
                stream: cx.origin.stream,
                step: cx.origin.step,
                reductions: cx.reductions.len() as u32,
                partial: cx.partial_shrink,
            },
        }
    }
}
