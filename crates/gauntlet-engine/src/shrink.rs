//! Counterexample minimization.
//!
//! Greedy rounds over the parameters in declaration order. A candidate
//! replaces the current tuple only when it reproduces the same failure
//! class; reproducing a different failure would silently change what the
//! counterexample witnesses. Stops at a fixed point (a full round with no
//! accepted reduction) or when the round budget runs out.

use std::time::Duration;

use gauntlet_profile::{
    ArgTuple, CharClass, FailureClass, FunctionSignature, ReductionStep, Value, ValueDomain,
};
use gauntlet_sandbox::{CallableRef, Sandbox};

use crate::config::PropertyConfig;
use crate::trial::{execute_classified, TrialVerdict};

#[derive(Debug, Clone)]
pub struct ShrinkOutcome {
    pub minimized: ArgTuple,
    pub reductions: Vec<ReductionStep>,
    /// The round budget ran out before a fixed point.
    pub partial: bool,
}

struct Oracle<'a> {
    sandbox: &'a dyn Sandbox,
    callable: &'a CallableRef,
    signature: &'a FunctionSignature,
    failure: &'a FailureClass,
    time_limit: Duration,
}

impl Oracle<'_> {
    fn still_fails(&self, args: &ArgTuple) -> bool {
        matches!(
            execute_classified(
                self.sandbox,
                self.callable,
                self.signature,
                args,
                self.time_limit,
            ),
            TrialVerdict::Fail(ref class) if class == self.failure
        )
    }
}

/// Minimize `origin` while preserving `failure`.
pub fn shrink(
    sandbox: &dyn Sandbox,
    callable: &CallableRef,
    signature: &FunctionSignature,
    origin: &ArgTuple,
    failure: &FailureClass,
    config: &PropertyConfig,
) -> ShrinkOutcome {
    let oracle = Oracle {
        sandbox,
        callable,
        signature,
        failure,
        time_limit: config.time_limit,
    };
    let mut current = origin.clone();
    let mut steps: Vec<ReductionStep> = Vec::new();
    let mut rounds = 0u32;
    let mut partial = false;
    loop {
        if rounds >= config.max_shrink_rounds {
            partial = true;
            break;
        }
        rounds += 1;
        let mut changed = false;
        for p in &signature.params {
            let Some(value) = current.get(&p.name).cloned() else {
                continue;
            };
            let mut fails = |candidate: &Value| {
                let mut probe = current.clone();
                probe.set(&p.name, candidate.clone());
                oracle.still_fails(&probe)
            };
            if let Some(reduced) =
                shrink_value(&p.name, &value, Some(&p.domain), &mut fails, &mut steps)
            {
                current.set(&p.name, reduced);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    log::debug!(
        "shrink of {}: {} -> {} in {} reductions{}",
        oracle.callable,
        origin,
        current,
        steps.len(),
        if partial { " (budget exhausted)" } else { "" }
    );
    ShrinkOutcome {
        minimized: current,
        reductions: steps,
        partial,
    }
}

/// Shrink one value. Returns the reduced value when anything was
/// accepted; `label` names the slot in recorded steps ("x", "cfg.count").
fn shrink_value(
    label: &str,
    value: &Value,
    domain: Option<&ValueDomain>,
    fails: &mut dyn FnMut(&Value) -> bool,
    steps: &mut Vec<ReductionStep>,
) -> Option<Value> {
    match value {
        Value::Int(v) => shrink_int(label, *v, fails, steps),
        Value::Float(v) => shrink_float(label, *v, fails, steps),
        Value::Str(s) => shrink_str(label, s, char_class_of(domain), fails, steps),
        Value::Composite(fields) => shrink_composite(label, fields, domain, fails, steps),
        Value::Null | Value::Bool(_) | Value::Enum(_) => None,
    }
}

fn record(steps: &mut Vec<ReductionStep>, label: &str, from: Value, to: Value) {
    steps.push(ReductionStep {
        param: label.to_string(),
        from,
        to,
    });
}

/// Bisect toward zero. `lo` always passes, `hi` always fails; the final
/// `hi` is the failing value closest to zero on the origin's side.
fn shrink_int(
    label: &str,
    v: i64,
    fails: &mut dyn FnMut(&Value) -> bool,
    steps: &mut Vec<ReductionStep>,
) -> Option<Value> {
    if v == 0 {
        return None;
    }
    if fails(&Value::Int(0)) {
        record(steps, label, Value::Int(v), Value::Int(0));
        return Some(Value::Int(0));
    }
    let mut lo: i64 = 0;
    let mut hi: i64 = v;
    while (hi as i128 - lo as i128).abs() > 1 {
        let mid = (lo as i128 + (hi as i128 - lo as i128) / 2) as i64;
        if fails(&Value::Int(mid)) {
            record(steps, label, Value::Int(hi), Value::Int(mid));
            hi = mid;
        } else {
            lo = mid;
        }
    }
    (hi != v).then_some(Value::Int(hi))
}

/// Zero first, then halve while the failure survives, then drop the
/// fractional part.
fn shrink_float(
    label: &str,
    v: f64,
    fails: &mut dyn FnMut(&Value) -> bool,
    steps: &mut Vec<ReductionStep>,
) -> Option<Value> {
    if v == 0.0 {
        return None;
    }
    if fails(&Value::Float(0.0)) {
        record(steps, label, Value::Float(v), Value::Float(0.0));
        return Some(Value::Float(0.0));
    }
    if v.is_nan() {
        return None;
    }
    let mut current = v;
    if current.is_infinite() {
        let capped = if current > 0.0 { f64::MAX } else { f64::MIN };
        if !fails(&Value::Float(capped)) {
            return None;
        }
        record(steps, label, Value::Float(current), Value::Float(capped));
        current = capped;
    }
    let mut halvings = 0u32;
    while halvings < 64 {
        let candidate = current / 2.0;
        if candidate == 0.0 || !fails(&Value::Float(candidate)) {
            break;
        }
        record(steps, label, Value::Float(current), Value::Float(candidate));
        current = candidate;
        halvings += 1;
    }
    let truncated = current.trunc();
    if truncated != current && fails(&Value::Float(truncated)) {
        record(steps, label, Value::Float(current), Value::Float(truncated));
        current = truncated;
    }
    (current != v).then_some(Value::Float(current))
}

fn char_class_of(domain: Option<&ValueDomain>) -> CharClass {
    match domain {
        Some(ValueDomain::StringPattern { char_class, .. }) => *char_class,
        Some(ValueDomain::Nullable { inner }) => char_class_of(Some(inner)),
        _ => CharClass::Any,
    }
}

/// Remove chunks (middle, front, back; halving the chunk as removals stop
/// working), then replace surviving characters with the class's simplest.
fn shrink_str(
    label: &str,
    s: &str,
    class: CharClass,
    fails: &mut dyn FnMut(&Value) -> bool,
    steps: &mut Vec<ReductionStep>,
) -> Option<Value> {
    let original = s.to_string();
    let mut chars: Vec<char> = s.chars().collect();
    if !chars.is_empty() && fails(&Value::Str(String::new())) {
        record(steps, label, Value::Str(original), Value::Str(String::new()));
        return Some(Value::Str(String::new()));
    }
    let mut chunk = (chars.len() / 2).max(1);
    while !chars.is_empty() {
        chunk = chunk.min(chars.len());
        let starts = [(chars.len() - chunk) / 2, 0, chars.len() - chunk];
        let mut removed = false;
        let mut tried: Vec<usize> = Vec::new();
        for &start in &starts {
            if tried.contains(&start) {
                continue;
            }
            tried.push(start);
            let mut candidate = chars.clone();
            candidate.drain(start..start + chunk);
            let candidate_s: String = candidate.iter().collect();
            if fails(&Value::Str(candidate_s.clone())) {
                record(
                    steps,
                    label,
                    Value::Str(chars.iter().collect()),
                    Value::Str(candidate_s),
                );
                chars = candidate;
                removed = true;
                break;
            }
        }
        if !removed {
            if chunk == 1 {
                break;
            }
            chunk /= 2;
        }
    }
    let canonical = class.simplest();
    for i in 0..chars.len() {
        if chars[i] == canonical {
            continue;
        }
        let mut candidate = chars.clone();
        candidate[i] = canonical;
        let candidate_s: String = candidate.iter().collect();
        if fails(&Value::Str(candidate_s.clone())) {
            record(
                steps,
                label,
                Value::Str(chars.iter().collect()),
                Value::Str(candidate_s),
            );
            chars = candidate;
        }
    }
    let reduced: String = chars.iter().collect();
    (reduced != original).then_some(Value::Str(reduced))
}

fn shrink_composite(
    label: &str,
    fields: &std::collections::BTreeMap<String, Value>,
    domain: Option<&ValueDomain>,
    fails: &mut dyn FnMut(&Value) -> bool,
    steps: &mut Vec<ReductionStep>,
) -> Option<Value> {
    let field_domains = match domain {
        Some(ValueDomain::Composite { fields }) => Some(fields),
        _ => None,
    };
    let mut current = fields.clone();
    let mut changed = false;
    let names: Vec<String> = current.keys().cloned().collect();
    for name in names {
        let Some(field_value) = current.get(&name).cloned() else {
            continue;
        };
        let field_domain = field_domains.and_then(|m| m.get(&name));
        let sub_label = format!("{label}.{name}");
        let mut field_fails = |candidate: &Value| {
            let mut probe = current.clone();
            probe.insert(name.clone(), candidate.clone());
            fails(&Value::Composite(probe))
        };
        if let Some(reduced) =
            shrink_value(&sub_label, &field_value, field_domain, &mut field_fails, steps)
        {
            current.insert(name.clone(), reduced);
            changed = true;
        }
    }
    changed.then_some(Value::Composite(current))
}
