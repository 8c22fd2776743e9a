//! Deterministic boundary value derivation.
//!
//! Each `ValueDomain` variant contributes a small literal corner set;
//! observed comparison literals are corners too. Multi-parameter
//! signatures combine corners pairwise, and the finished catalog is
//! deduplicated and sorted so an unchanged signature always yields an
//! identical case list.

use std::collections::HashSet;

use gauntlet_profile::{
    ArgTuple, EdgeCase, FunctionSignature, ParameterProfile, Value, ValueDomain,
};

use crate::pairwise;

/// Probe values for a parameter nothing was learned about: the classic
/// coercion edges.
fn coercion_probes() -> Vec<(Value, String)> {
    vec![
        (Value::Int(0), "probe zero".to_string()),
        (Value::Int(-1), "probe negative".to_string()),
        (Value::Int(1 << 31), "probe large".to_string()),
        (Value::Str(String::new()), "probe empty string".to_string()),
        (Value::Null, "probe null".to_string()),
    ]
}

/// Boundary values a domain contributes, each with the reason it was
/// chosen. Values may sit just outside the domain on purpose (length
/// overruns, out-of-class characters); the expected classification is the
/// caller's concern.
pub fn domain_edge_values(domain: &ValueDomain) -> Vec<(Value, String)> {
    let mut out = Vec::new();
    match domain {
        ValueDomain::IntRange { min, max } => {
            out.push((Value::Int(*min), "min".to_string()));
            out.push((Value::Int(*max), "max".to_string()));
            if (*max as i128) - (*min as i128) > 1 {
                out.push((Value::Int(min + 1), "min+1".to_string()));
                out.push((Value::Int(max - 1), "max-1".to_string()));
            }
            if *min <= 0 && *max >= 0 {
                out.push((Value::Int(0), "zero".to_string()));
            }
            if *min <= -1 && *max >= -1 {
                out.push((Value::Int(-1), "minus one".to_string()));
            }
        }
        ValueDomain::FloatRange { min, max, allow_nan } => {
            out.push((Value::Float(*min), "min".to_string()));
            out.push((Value::Float(*max), "max".to_string()));
            if *min <= 0.0 && *max >= 0.0 {
                out.push((Value::Float(0.0), "zero".to_string()));
            }
            if *min <= f64::EPSILON && *max >= f64::EPSILON {
                out.push((Value::Float(f64::EPSILON), "epsilon".to_string()));
            }
            if *allow_nan {
                out.push((Value::Float(f64::NAN), "nan".to_string()));
            }
        }
        ValueDomain::StringPattern { min_len, max_len, char_class } => {
            let unit = char_class.simplest();
            out.push((Value::Str(String::new()), "empty".to_string()));
            if *min_len > 0 {
                out.push((
                    Value::Str(unit.to_string().repeat(*min_len)),
                    "min length".to_string(),
                ));
            }
            out.push((
                Value::Str(unit.to_string().repeat(*max_len)),
                "max length".to_string(),
            ));
            out.push((
                Value::Str(unit.to_string().repeat(*max_len + 1)),
                "over max length".to_string(),
            ));
            if let Some(outside) = char_class.sample_outside() {
                let len = (*min_len).max(1);
                let mut s = unit.to_string().repeat(len - 1);
                s.push(outside);
                out.push((Value::Str(s), "outside char class".to_string()));
            }
        }
        ValueDomain::Enum { values } => {
            for v in values {
                out.push((Value::Enum(v.clone()), "variant".to_string()));
            }
        }
        ValueDomain::Nullable { inner } => {
            out.push((Value::Null, "null".to_string()));
            out.extend(domain_edge_values(inner));
        }
        ValueDomain::Composite { fields } => {
            // Field corners combine pairwise, same as top-level parameters.
            let axes: Vec<(String, Vec<Value>)> = fields
                .iter()
                .map(|(name, domain)| {
                    let values = domain_edge_values(domain)
                        .into_iter()
                        .map(|(v, _)| v)
                        .collect();
                    (name.clone(), values)
                })
                .collect();
            for tuple in pairwise::cover(&axes) {
                out.push((Value::Composite(tuple), "field corners".to_string()));
            }
        }
        ValueDomain::Unknown => out.extend(coercion_probes()),
    }
    out
}

/// A parameter's full edge list: domain corners plus every observed
/// comparison literal, deduplicated with the first tag winning. Always
/// non-empty so combination stays total.
pub fn edge_values(profile: &ParameterProfile) -> Vec<(Value, String)> {
    let mut out = domain_edge_values(&profile.domain);
    for value in &profile.observed {
        out.push((value.clone(), "observed".to_string()));
    }
    let mut seen = HashSet::new();
    out.retain(|(value, _)| seen.insert(value.clone()));
    if out.is_empty() {
        out = coercion_probes();
    }
    out
}

/// The deterministic edge case catalog for one signature.
pub fn catalog(signature: &FunctionSignature) -> Vec<EdgeCase> {
    let mut cases = match signature.params.len() {
        0 => vec![EdgeCase::new(ArgTuple::new(), "no arguments")],
        1 => {
            let profile = &signature.params[0];
            edge_values(profile)
                .into_iter()
                .map(|(value, tag)| {
                    let args = ArgTuple::new().with(&profile.name, value);
                    EdgeCase::new(args, format!("{}={tag}", profile.name))
                })
                .collect()
        }
        _ => {
            let axes: Vec<(String, Vec<(Value, String)>)> = signature
                .params
                .iter()
                .map(|p| (p.name.clone(), edge_values(p)))
                .collect();
            let plain: Vec<(String, Vec<Value>)> = axes
                .iter()
                .map(|(name, values)| {
                    (name.clone(), values.iter().map(|(v, _)| v.clone()).collect())
                })
                .collect();
            pairwise::cover(&plain)
                .into_iter()
                .map(|tuple| {
                    let tag = axes
                        .iter()
                        .map(|(name, values)| {
                            let assigned = &tuple[name];
                            let value_tag = values
                                .iter()
                                .find(|(v, _)| v == assigned)
                                .map(|(_, t)| t.as_str())
                                .unwrap_or("corner");
                            format!("{name}={value_tag}")
                        })
                        .collect::<Vec<_>>()
                        .join(", ");
                    EdgeCase::new(ArgTuple { values: tuple }, tag)
                })
                .collect()
        }
    };

    cases.sort_by(|a, b| a.args.cmp(&b.args));
    cases.dedup_by(|a, b| a.args == b.args);
    cases
}
