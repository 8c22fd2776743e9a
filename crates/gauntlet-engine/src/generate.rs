//! Generation strategies per domain variant.
//!
//! Every byte of randomness comes from the caller's stream RNG, so a
//! candidate is fully determined by (seed, stream, step). One draw in
//! eight is redirected at a domain corner or observed literal instead of
//! the uniform pick; the redirect consumes the same stream, so replays
//! stay exact.

use std::collections::BTreeSet;

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use gauntlet_profile::{ArgTuple, CharClass, FunctionSignature, Value, ValueDomain};

/// Draw a full argument tuple, parameters in declaration order.
pub fn draw_args(rng: &mut ChaCha8Rng, signature: &FunctionSignature) -> ArgTuple {
    let mut args = ArgTuple::new();
    for p in &signature.params {
        args.set(&p.name, draw_value(rng, &p.domain, &p.observed));
    }
    args
}

/// Draw one value from a domain.
pub fn draw_value(
    rng: &mut ChaCha8Rng,
    domain: &ValueDomain,
    observed: &BTreeSet<Value>,
) -> Value {
    if rng.gen_range(0u32..8) == 0 {
        let corners = corner_values(domain, observed);
        if !corners.is_empty() {
            return corners[rng.gen_range(0..corners.len())].clone();
        }
    }
    uniform_draw(rng, domain, observed)
}

fn uniform_draw(
    rng: &mut ChaCha8Rng,
    domain: &ValueDomain,
    observed: &BTreeSet<Value>,
) -> Value {
    match domain {
        ValueDomain::IntRange { min, max } => Value::Int(rng.gen_range(*min..=*max)),
        ValueDomain::FloatRange { min, max, .. } => {
            // Uniform sampling needs finite bounds; corners still inject
            // the infinities and NaN where the domain allows them.
            let lo = if min.is_finite() { *min } else { -1.0e9 };
            let hi = if max.is_finite() { *max } else { 1.0e9 };
            let hi = hi.max(lo);
            Value::Float(rng.gen_range(lo..=hi))
        }
        ValueDomain::StringPattern { min_len, max_len, char_class } => {
            let len = rng.gen_range(*min_len..=*max_len);
            let mut s = String::with_capacity(len);
            for _ in 0..len {
                s.push(draw_char(rng, *char_class));
            }
            Value::Str(s)
        }
        ValueDomain::Enum { values } => {
            if values.is_empty() {
                Value::Null
            } else {
                Value::Enum(values[rng.gen_range(0..values.len())].clone())
            }
        }
        ValueDomain::Nullable { inner } => {
            if rng.gen_range(0u32..4) == 0 {
                Value::Null
            } else {
                draw_value(rng, inner, observed)
            }
        }
        ValueDomain::Composite { fields } => Value::Composite(
            fields
                .iter()
                .map(|(name, field)| (name.clone(), draw_value(rng, field, observed)))
                .collect(),
        ),
        ValueDomain::Unknown => match rng.gen_range(0u32..5) {
            0 => Value::Int(rng.gen_range(-1_000_000..=1_000_000)),
            1 => Value::Float(rng.gen_range(-1.0e6..=1.0e6)),
            2 => {
                let len = rng.gen_range(0usize..=8);
                let mut s = String::with_capacity(len);
                for _ in 0..len {
                    s.push(draw_char(rng, CharClass::Alphanumeric));
                }
                Value::Str(s)
            }
            3 => Value::Bool(rng.gen()),
            _ => Value::Null,
        },
    }
}

fn draw_char(rng: &mut ChaCha8Rng, class: CharClass) -> char {
    match class {
        CharClass::Digits => char::from(b'0' + rng.gen_range(0u8..10)),
        CharClass::Alphanumeric => {
            const ALNUM: &[u8] =
                b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
            ALNUM[rng.gen_range(0..ALNUM.len())] as char
        }
        CharClass::Printable | CharClass::Any => char::from(rng.gen_range(0x20u8..=0x7e)),
    }
}

/// The corner pool one draw in eight aims at.
fn corner_values(domain: &ValueDomain, observed: &BTreeSet<Value>) -> Vec<Value> {
    let mut corners = match domain {
        ValueDomain::IntRange { min, max } => {
            let mut c = vec![Value::Int(*min), Value::Int(*max)];
            if *min <= 0 && *max >= 0 {
                c.push(Value::Int(0));
            }
            c
        }
        ValueDomain::FloatRange { min, max, allow_nan } => {
            let mut c = vec![Value::Float(*min), Value::Float(*max)];
            if *min <= 0.0 && *max >= 0.0 {
                c.push(Value::Float(0.0));
            }
            if *allow_nan {
                c.push(Value::Float(f64::NAN));
            }
            c
        }
        ValueDomain::StringPattern { min_len, max_len, char_class } => {
            let unit = char_class.simplest().to_string();
            let mut c = Vec::new();
            if *min_len == 0 {
                c.push(Value::Str(String::new()));
            } else {
                c.push(Value::Str(unit.repeat(*min_len)));
            }
            c.push(Value::Str(unit.repeat(*max_len)));
            c
        }
        ValueDomain::Enum { values } => {
            values.iter().map(|v| Value::Enum(v.clone())).collect()
        }
        ValueDomain::Nullable { inner } => {
            let mut c = corner_values(inner, &BTreeSet::new());
            c.push(Value::Null);
            c
        }
        // Composite fields corner-inject individually during the draw.
        ValueDomain::Composite { .. } => Vec::new(),
        ValueDomain::Unknown => vec![
            Value::Int(0),
            Value::Int(-1),
            Value::Int(1 << 31),
            Value::Str(String::new()),
            Value::Null,
        ],
    };
    for value in observed {
        if domain.contains(value) && !corners.contains(value) {
            corners.push(value.clone());
        }
    }
    corners
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::trial_rng;

    fn draws(domain: &ValueDomain, n: usize) -> Vec<Value> {
        let mut rng = trial_rng(42, 0);
        let observed = BTreeSet::new();
        (0..n).map(|_| draw_value(&mut rng, domain, &observed)).collect()
    }

    #[test]
    fn test_same_stream_reproduces_sequence() {
        let domain = ValueDomain::IntRange { min: -100, max: 100 };
        assert_eq!(draws(&domain, 50), draws(&domain, 50));
    }

    #[test]
    fn test_int_draws_stay_in_domain() {
        let domain = ValueDomain::IntRange { min: -100, max: 100 };
        for value in draws(&domain, 500) {
            assert!(domain.contains(&value), "{value} escaped the domain");
        }
    }

    #[test]
    fn test_corner_injection_hits_bounds() {
        let domain = ValueDomain::IntRange { min: -100, max: 100 };
        let drawn = draws(&domain, 800);
        assert!(drawn.contains(&Value::Int(-100)));
        assert!(drawn.contains(&Value::Int(100)));
        assert!(drawn.contains(&Value::Int(0)));
    }

    #[test]
    fn test_observed_literal_gets_injected() {
        let domain = ValueDomain::IntRange { min: 0, max: 1_000_000 };
        let observed: BTreeSet<Value> = [Value::Int(86_400)].into_iter().collect();
        let mut rng = trial_rng(42, 0);
        let drawn: Vec<Value> =
            (0..800).map(|_| draw_value(&mut rng, &domain, &observed)).collect();
        assert!(drawn.contains(&Value::Int(86_400)));
    }

    #[test]
    fn test_string_draws_respect_pattern() {
        let domain = ValueDomain::StringPattern {
            min_len: 2,
            max_len: 6,
            char_class: CharClass::Digits,
        };
        for value in draws(&domain, 200) {
            let Value::Str(s) = &value else {
                panic!("expected string, got {value}");
            };
            assert!(s.len() >= 2 && s.len() <= 6);
            assert!(s.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_enum_draws_only_variants() {
        let domain = ValueDomain::Enum {
            values: vec!["red".into(), "green".into()],
        };
        for value in draws(&domain, 100) {
            assert!(domain.contains(&value));
        }
    }

    #[test]
    fn test_nullable_mixes_null_and_inner() {
        let domain = ValueDomain::Nullable {
            inner: Box::new(ValueDomain::IntRange { min: 0, max: 9 }),
        };
        let drawn = draws(&domain, 200);
        assert!(drawn.iter().any(|v| *v == Value::Null));
        assert!(drawn.iter().any(|v| matches!(v, Value::Int(_))));
    }

    #[test]
    fn test_unknown_rotates_archetypes() {
        let drawn = draws(&ValueDomain::Unknown, 300);
        assert!(drawn.iter().any(|v| matches!(v, Value::Int(_))));
        assert!(drawn.iter().any(|v| matches!(v, Value::Str(_))));
        assert!(drawn.iter().any(|v| *v == Value::Null));
    }

    #[test]
    fn test_draw_args_assigns_every_parameter() {
        use gauntlet_profile::ParameterProfile;
        let signature = FunctionSignature {
            qualified_name: "m::f".into(),
            params: vec![
                ParameterProfile {
                    name: "a".into(),
                    hint: None,
                    domain: ValueDomain::IntRange { min: 0, max: 10 },
                    observed: BTreeSet::new(),
                    rejected: Vec::new(),
                    roles: BTreeSet::new(),
                },
                ParameterProfile {
                    name: "b".into(),
                    hint: None,
                    domain: ValueDomain::string_any(),
                    observed: BTreeSet::new(),
                    rejected: Vec::new(),
                    roles: BTreeSet::new(),
                },
            ],
            return_hint: None,
            error_conditions: BTreeSet::new(),
            relations: Vec::new(),
            complexity: 1,
            is_async: false,
        };
        let mut rng = trial_rng(42, 0);
        let args = draw_args(&mut rng, &signature);
        assert_eq!(args.len(), 2);
        assert!(matches!(args.get("a"), Some(Value::Int(_))));
        assert!(matches!(args.get("b"), Some(Value::Str(_))));
    }
}
