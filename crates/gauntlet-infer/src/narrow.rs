//! Interval narrowing for guard constraints.
//!
//! Narrowing is boundary-inclusive: a constraint against literal `L`
//! intersects with the interval *closed* at `L`, so the compared constant
//! itself never leaves the domain. The strict side of the guard lives in
//! the rejection evidence instead, and `Ne` never removes points. A
//! comparison on an `Unknown` domain first reveals the literal's type,
//! then narrows the revealed domain.

use gauntlet_ast::node::CmpOp;
use gauntlet_profile::{Value, ValueDomain};

/// Outcome of applying one guard constraint to a domain.
#[derive(Debug, Clone, PartialEq)]
pub enum Narrowed {
    /// The refined domain.
    Domain(ValueDomain),
    /// The constraint carries no interval information for this domain.
    Unchanged,
    /// The constraint contradicts the current domain or mixes types.
    Contradiction,
}

pub fn narrow_by_literal(domain: &ValueDomain, op: CmpOp, literal: &Value) -> Narrowed {
    let base = match (domain, literal) {
        (ValueDomain::Unknown, Value::Int(_)) => ValueDomain::int_full(),
        (ValueDomain::Unknown, Value::Float(_)) => ValueDomain::float_full(),
        (ValueDomain::Unknown, Value::Str(_)) => ValueDomain::string_any(),
        // Null and bool comparisons observe; they don't shape intervals.
        (ValueDomain::Unknown, _) => return Narrowed::Unchanged,
        _ => domain.clone(),
    };

    match (&base, literal) {
        (ValueDomain::IntRange { min, max }, Value::Int(l)) => {
            narrow_int(*min, *max, op, *l)
        }
        (ValueDomain::FloatRange { min, max, .. }, Value::Float(l)) => {
            narrow_float(*min, *max, op, *l)
        }
        // Integer literals against float parameters come up constantly.
        (ValueDomain::FloatRange { min, max, .. }, Value::Int(l)) => {
            narrow_float(*min, *max, op, *l as f64)
        }
        (
            ValueDomain::StringPattern { min_len, max_len, char_class },
            Value::Str(s),
        ) => {
            // Equality against a literal string pins the length; anything
            // else says nothing about the pattern.
            if op == CmpOp::Eq {
                let len = s.chars().count();
                if len < *min_len || len > *max_len {
                    Narrowed::Contradiction
                } else {
                    Narrowed::Domain(ValueDomain::StringPattern {
                        min_len: len,
                        max_len: len,
                        char_class: *char_class,
                    })
                }
            } else {
                Narrowed::Unchanged
            }
        }
        (ValueDomain::Enum { values }, Value::Str(l))
        | (ValueDomain::Enum { values }, Value::Enum(l)) => {
            if op == CmpOp::Eq {
                if values.iter().any(|v| v == l) {
                    Narrowed::Domain(ValueDomain::Enum {
                        values: vec![l.clone()],
                    })
                } else {
                    Narrowed::Contradiction
                }
            } else {
                Narrowed::Unchanged
            }
        }
        // The null stays: a guard on the inner value is exactly the case
        // where a null argument would blow up, which we want to keep
        // generating.
        (ValueDomain::Nullable { inner }, lit) => match narrow_by_literal(inner, op, lit) {
            Narrowed::Domain(d) => Narrowed::Domain(ValueDomain::Nullable {
                inner: Box::new(d),
            }),
            other => other,
        },
        (ValueDomain::Composite { .. }, _) => Narrowed::Unchanged,
        _ => Narrowed::Contradiction,
    }
}

/// Apply a `len(param) op n` guard to a string domain.
pub fn narrow_by_len(domain: &ValueDomain, op: CmpOp, len: i64) -> Narrowed {
    let base = match domain {
        ValueDomain::Unknown => ValueDomain::string_any(),
        other => other.clone(),
    };
    match base {
        ValueDomain::StringPattern { min_len, max_len, char_class } => {
            let (new_min, new_max) = match op {
                CmpOp::Lt | CmpOp::Le => {
                    if len < 0 {
                        return Narrowed::Contradiction;
                    }
                    (min_len, max_len.min(len as usize))
                }
                CmpOp::Gt | CmpOp::Ge => (min_len.max(len.max(0) as usize), max_len),
                CmpOp::Eq => {
                    if len < 0 {
                        return Narrowed::Contradiction;
                    }
                    (len as usize, len as usize)
                }
                CmpOp::Ne => return Narrowed::Unchanged,
            };
            if new_min > new_max {
                Narrowed::Contradiction
            } else {
                Narrowed::Domain(ValueDomain::StringPattern {
                    min_len: new_min,
                    max_len: new_max,
                    char_class,
                })
            }
        }
        ValueDomain::Nullable { inner } => match narrow_by_len(&inner, op, len) {
            Narrowed::Domain(d) => Narrowed::Domain(ValueDomain::Nullable {
                inner: Box::new(d),
            }),
            other => other,
        },
        _ => Narrowed::Contradiction,
    }
}

fn narrow_int(min: i64, max: i64, op: CmpOp, l: i64) -> Narrowed {
    let (new_min, new_max) = match op {
        CmpOp::Lt | CmpOp::Le => (min, max.min(l)),
        CmpOp::Gt | CmpOp::Ge => (min.max(l), max),
        CmpOp::Eq => (l, l),
        CmpOp::Ne => return Narrowed::Unchanged,
    };
    if new_min > new_max || (op == CmpOp::Eq && (l < min || l > max)) {
        Narrowed::Contradiction
    } else {
        Narrowed::Domain(ValueDomain::IntRange {
            min: new_min,
            max: new_max,
        })
    }
}

fn narrow_float(min: f64, max: f64, op: CmpOp, l: f64) -> Narrowed {
    if l.is_nan() {
        return Narrowed::Unchanged;
    }
    let (new_min, new_max) = match op {
        CmpOp::Lt | CmpOp::Le => (min, max.min(l)),
        CmpOp::Gt | CmpOp::Ge => (min.max(l), max),
        CmpOp::Eq => (l, l),
        CmpOp::Ne => return Narrowed::Unchanged,
    };
    if new_min > new_max || (op == CmpOp::Eq && (l < min || l > max)) {
        Narrowed::Contradiction
    } else {
        Narrowed::Domain(ValueDomain::FloatRange {
            min: new_min,
            max: new_max,
            // A comparison that survived proves the value was comparable.
            allow_nan: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upper_bound_is_closed_at_literal() {
        // Surviving x > 50 still keeps 50 itself in the domain.
        let d = ValueDomain::IntRange { min: 0, max: 1000 };
        assert_eq!(
            narrow_by_literal(&d, CmpOp::Gt, &Value::Int(50)),
            Narrowed::Domain(ValueDomain::IntRange { min: 50, max: 1000 })
        );
        assert_eq!(
            narrow_by_literal(&d, CmpOp::Lt, &Value::Int(50)),
            Narrowed::Domain(ValueDomain::IntRange { min: 0, max: 50 })
        );
    }

    #[test]
    fn test_ne_changes_nothing() {
        let d = ValueDomain::IntRange { min: -100, max: 100 };
        assert_eq!(
            narrow_by_literal(&d, CmpOp::Ne, &Value::Int(0)),
            Narrowed::Unchanged
        );
    }

    #[test]
    fn test_eq_pins_to_point() {
        let d = ValueDomain::IntRange { min: 0, max: 10 };
        assert_eq!(
            narrow_by_literal(&d, CmpOp::Eq, &Value::Int(3)),
            Narrowed::Domain(ValueDomain::IntRange { min: 3, max: 3 })
        );
        assert_eq!(
            narrow_by_literal(&d, CmpOp::Eq, &Value::Int(42)),
            Narrowed::Contradiction
        );
    }

    #[test]
    fn test_unknown_reveals_type_then_narrows() {
        assert_eq!(
            narrow_by_literal(&ValueDomain::Unknown, CmpOp::Gt, &Value::Int(50)),
            Narrowed::Domain(ValueDomain::IntRange {
                min: 50,
                max: i64::MAX
            })
        );
        assert!(matches!(
            narrow_by_literal(&ValueDomain::Unknown, CmpOp::Lt, &Value::Float(1.5)),
            Narrowed::Domain(ValueDomain::FloatRange { .. })
        ));
        assert_eq!(
            narrow_by_literal(&ValueDomain::Unknown, CmpOp::Eq, &Value::Null),
            Narrowed::Unchanged
        );
    }

    #[test]
    fn test_contradictory_bounds() {
        let d = ValueDomain::IntRange { min: 10, max: 20 };
        assert_eq!(
            narrow_by_literal(&d, CmpOp::Lt, &Value::Int(5)),
            Narrowed::Contradiction
        );
    }

    #[test]
    fn test_type_mismatch_is_contradiction() {
        let d = ValueDomain::IntRange { min: 0, max: 10 };
        assert_eq!(
            narrow_by_literal(&d, CmpOp::Eq, &Value::Str("five".into())),
            Narrowed::Contradiction
        );
    }

    #[test]
    fn test_nullable_narrows_inner_and_keeps_null() {
        let d = ValueDomain::Nullable {
            inner: Box::new(ValueDomain::IntRange { min: 0, max: 100 }),
        };
        let Narrowed::Domain(ValueDomain::Nullable { inner }) =
            narrow_by_literal(&d, CmpOp::Ge, &Value::Int(10))
        else {
            panic!("expected nullable domain");
        };
        assert_eq!(*inner, ValueDomain::IntRange { min: 10, max: 100 });
    }

    #[test]
    fn test_enum_eq_selects_single_value() {
        let d = ValueDomain::Enum {
            values: vec!["fast".into(), "slow".into()],
        };
        assert_eq!(
            narrow_by_literal(&d, CmpOp::Eq, &Value::Str("fast".into())),
            Narrowed::Domain(ValueDomain::Enum {
                values: vec!["fast".into()]
            })
        );
        assert_eq!(
            narrow_by_literal(&d, CmpOp::Eq, &Value::Str("warp".into())),
            Narrowed::Contradiction
        );
    }

    #[test]
    fn test_float_comparison_drops_nan() {
        let d = ValueDomain::float_full();
        let Narrowed::Domain(ValueDomain::FloatRange { min, max, allow_nan }) =
            narrow_by_literal(&d, CmpOp::Ge, &Value::Float(0.0))
        else {
            panic!("expected float domain");
        };
        assert_eq!(min, 0.0);
        assert_eq!(max, f64::INFINITY);
        assert!(!allow_nan);
    }

    #[test]
    fn test_len_guard_narrows_string() {
        let d = ValueDomain::string_any();
        let Narrowed::Domain(ValueDomain::StringPattern { min_len, max_len, .. }) =
            narrow_by_len(&d, CmpOp::Le, 32)
        else {
            panic!("expected string domain");
        };
        assert_eq!((min_len, max_len), (0, 32));

        assert_eq!(
            narrow_by_len(
                &ValueDomain::StringPattern {
                    min_len: 10,
                    max_len: 20,
                    char_class: gauntlet_profile::CharClass::Any,
                },
                CmpOp::Lt,
                5
            ),
            Narrowed::Contradiction
        );
    }

    #[test]
    fn test_len_guard_on_unknown_reveals_string() {
        let Narrowed::Domain(ValueDomain::StringPattern { min_len, .. }) =
            narrow_by_len(&ValueDomain::Unknown, CmpOp::Ge, 1)
        else {
            panic!("expected string domain");
        };
        assert_eq!(min_len, 1);
    }

    #[test]
    fn test_len_guard_on_int_is_contradiction() {
        let d = ValueDomain::IntRange { min: 0, max: 10 };
        assert_eq!(narrow_by_len(&d, CmpOp::Le, 5), Narrowed::Contradiction);
    }
}
