//! The failure mode library.
//!
//! A static ordered table of shapes known to break callables. Matching is
//! a pure predicate over the inferred signature; the table is loaded once
//! into a `OnceLock` and read-only afterwards, so the parallel analysis
//! phase shares it without locking. New patterns are appended, never
//! edited in place, which keeps every existing pattern's behavior
//! testable on its own.

use std::sync::OnceLock;

use log::debug;

use gauntlet_profile::{
    ArgTuple, EdgeCase, ExpectedClass, FailureClass, FunctionSignature, TestCaseRecord,
    UsageRole, Value, ValueDomain,
};

/// Loop and allocation probes use a count just past the 32-bit line.
const HUGE_COUNT: i64 = 1 << 32;

/// Which parameter a pattern matched, and the evidence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchEvidence {
    pub param: String,
    pub detail: String,
}

/// One entry in the failure mode table.
#[derive(Debug, Clone, Copy)]
pub struct FailurePattern {
    pub name: &'static str,
    pub description: &'static str,
    pub matches: fn(&FunctionSignature) -> Option<MatchEvidence>,
    pub generate: fn(&FunctionSignature, &MatchEvidence) -> Vec<EdgeCase>,
    pub expects: fn(&FunctionSignature) -> ExpectedClass,
}

static PATTERNS: OnceLock<Vec<FailurePattern>> = OnceLock::new();

/// The built-in table, in fixed order.
pub fn load_patterns() -> &'static [FailurePattern] {
    PATTERNS
        .get_or_init(|| {
            vec![
                division_shape(),
                index_shape(),
                resource_shape(),
                null_shape(),
            ]
        })
        .as_slice()
}

/// Every pattern that fires on this signature, in table order.
pub fn match_patterns(
    signature: &FunctionSignature,
) -> Vec<(&'static FailurePattern, MatchEvidence)> {
    load_patterns()
        .iter()
        .filter_map(|p| (p.matches)(signature).map(|ev| (p, ev)))
        .collect()
}

/// Test case records from every matching pattern.
pub fn pattern_records(signature: &FunctionSignature) -> Vec<TestCaseRecord> {
    let mut records = Vec::new();
    for (pattern, evidence) in match_patterns(signature) {
        debug!(
            "{}: {} fired ({})",
            signature.qualified_name, pattern.name, evidence.detail
        );
        let expected = (pattern.expects)(signature);
        for case in (pattern.generate)(signature, &evidence) {
            records.push(TestCaseRecord::from_pattern_case(
                &case,
                pattern.name,
                expected.clone(),
            ));
        }
    }
    records
}

fn division_shape() -> FailurePattern {
    FailurePattern {
        name: "division-shape",
        description: "a divisor's domain contains zero",
        matches: |sig| {
            sig.params
                .iter()
                .find(|p| {
                    p.has_role(UsageRole::Divisor)
                        && (p.domain.is_numeric() || p.domain == ValueDomain::Unknown)
                        && p.domain.contains_zero()
                })
                .map(|p| MatchEvidence {
                    param: p.name.clone(),
                    detail: format!("divisor {} may be zero ({})", p.name, p.domain),
                })
        },
        generate: |sig, ev| {
            let Some(profile) = sig.param(&ev.param) else {
                return Vec::new();
            };
            let mut cases = vec![case_with(
                sig,
                &ev.param,
                zero_for(&profile.domain),
                "zero divisor",
            )];
            if is_float(&profile.domain) {
                cases.push(case_with(
                    sig,
                    &ev.param,
                    Value::Float(-0.0),
                    "negative zero divisor",
                ));
                cases.push(case_with(
                    sig,
                    &ev.param,
                    Value::Float(f64::EPSILON),
                    "epsilon divisor",
                ));
            }
            cases
        },
        expects: |sig| declared_or_witness(sig, "ZeroDivisionError"),
    }
}

fn index_shape() -> FailurePattern {
    FailurePattern {
        name: "index-shape",
        description: "an index with no observed upper bound",
        matches: |sig| {
            sig.params
                .iter()
                .find(|p| {
                    p.has_role(UsageRole::IndexBound)
                        && p.domain.unbounded_above()
                        && !sig.has_relational_upper_bound(&p.name)
                })
                .map(|p| MatchEvidence {
                    param: p.name.clone(),
                    detail: format!("index {} has no upper bound", p.name),
                })
        },
        generate: |sig, ev| {
            vec![
                case_with(sig, &ev.param, Value::Int(i64::MAX), "huge index"),
                case_with(sig, &ev.param, Value::Int(-1), "negative index"),
            ]
        },
        expects: |sig| declared_or_witness(sig, "IndexError"),
    }
}

fn resource_shape() -> FailurePattern {
    FailurePattern {
        name: "resource-shape",
        description: "an unbounded loop bound or allocation size",
        matches: |sig| {
            sig.params
                .iter()
                .find(|p| {
                    (p.has_role(UsageRole::LoopBound) || p.has_role(UsageRole::AllocSize))
                        && p.domain.unbounded_above()
                })
                .map(|p| MatchEvidence {
                    param: p.name.clone(),
                    detail: format!("count {} has no upper bound", p.name),
                })
        },
        generate: |sig, ev| vec![case_with(sig, &ev.param, Value::Int(HUGE_COUNT), "huge count")],
        expects: |_| ExpectedClass::FailureWitness {
            class: FailureClass::Timeout,
        },
    }
}

fn null_shape() -> FailurePattern {
    FailurePattern {
        name: "null-shape",
        description: "a nullable parameter the body consumes",
        matches: |sig| {
            sig.params
                .iter()
                .find(|p| matches!(p.domain, ValueDomain::Nullable { .. }))
                .map(|p| MatchEvidence {
                    param: p.name.clone(),
                    detail: format!("{} accepts null", p.name),
                })
        },
        generate: |sig, ev| vec![case_with(sig, &ev.param, Value::Null, "null injection")],
        expects: |sig| declared_or_witness(sig, "TypeError"),
    }
}

/// Expected class for a case probing error kind `kind`: the declared
/// path when the signature names it, otherwise a defect witness.
fn declared_or_witness(sig: &FunctionSignature, kind: &str) -> ExpectedClass {
    if sig.declares_error(kind) {
        ExpectedClass::DeclaredError { kind: kind.to_string() }
    } else {
        ExpectedClass::FailureWitness {
            class: FailureClass::RaisedUndeclared { kind: kind.to_string() },
        }
    }
}

/// Probe the target parameter; every other parameter gets a boring
/// in-domain value so the case isolates one suspicion.
fn case_with(sig: &FunctionSignature, target: &str, value: Value, tag: &str) -> EdgeCase {
    let mut args = ArgTuple::new();
    for p in &sig.params {
        if p.name == target {
            args.set(&p.name, value.clone());
        } else {
            args.set(&p.name, nominal_value(&p.domain));
        }
    }
    EdgeCase::new(args, tag)
}

fn nominal_value(domain: &ValueDomain) -> Value {
    match domain {
        ValueDomain::IntRange { min, max } => {
            if *min <= 1 && *max >= 1 {
                Value::Int(1)
            } else {
                Value::Int(*min)
            }
        }
        ValueDomain::FloatRange { min, max, .. } => {
            if *min <= 1.0 && *max >= 1.0 {
                Value::Float(1.0)
            } else {
                Value::Float(*min)
            }
        }
        ValueDomain::StringPattern { min_len, max_len, char_class } => {
            let len = (*min_len).max(1).min(*max_len);
            Value::Str(char_class.simplest().to_string().repeat(len))
        }
        ValueDomain::Enum { values } => match values.first() {
            Some(v) => Value::Enum(v.clone()),
            None => Value::Null,
        },
        ValueDomain::Nullable { inner } => nominal_value(inner),
        ValueDomain::Composite { fields } => Value::Composite(
            fields
                .iter()
                .map(|(name, domain)| (name.clone(), nominal_value(domain)))
                .collect(),
        ),
        ValueDomain::Unknown => Value::Int(1),
    }
}

fn zero_for(domain: &ValueDomain) -> Value {
    match domain {
        ValueDomain::FloatRange { .. } => Value::Float(0.0),
        ValueDomain::Nullable { inner } => zero_for(inner),
        _ => Value::Int(0),
    }
}

fn is_float(domain: &ValueDomain) -> bool {
    match domain {
        ValueDomain::FloatRange { .. } => true,
        ValueDomain::Nullable { inner } => is_float(inner),
        _ => false,
    }
}
