//! Value domains: the inferred model of what a parameter accepts.
//!
//! `Unknown` is the universal superset. Refinement is intersection and
//! only ever narrows; a refinement that would empty the domain (or mix
//! incompatible variants) returns `None` so the caller can keep the
//! previous domain and record the contradiction instead.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Length cap applied to strings with no inferred upper bound.
pub const DEFAULT_MAX_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValueDomain {
    IntRange {
        min: i64,
        max: i64,
    },
    FloatRange {
        min: f64,
        max: f64,
        allow_nan: bool,
    },
    StringPattern {
        min_len: usize,
        max_len: usize,
        char_class: CharClass,
    },
    Enum {
        values: Vec<String>,
    },
    Nullable {
        inner: Box<ValueDomain>,
    },
    Composite {
        fields: BTreeMap<String, ValueDomain>,
    },
    Unknown,
}

/// Character classes form a chain: Any ⊇ Printable ⊇ Alphanumeric ⊇ Digits,
/// so intersecting two classes is just taking the narrower one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharClass {
    Any,
    Printable,
    Alphanumeric,
    Digits,
}

impl CharClass {
    pub fn contains(self, c: char) -> bool {
        match self {
            CharClass::Any => true,
            CharClass::Printable => !c.is_control(),
            CharClass::Alphanumeric => c.is_ascii_alphanumeric(),
            CharClass::Digits => c.is_ascii_digit(),
        }
    }

    /// Canonical simplest member; the shrinker replaces characters with
    /// this.
    pub fn simplest(self) -> char {
        match self {
            CharClass::Digits => '0',
            _ => 'a',
        }
    }

    /// A character outside the class, if one exists.
    pub fn sample_outside(self) -> Option<char> {
        match self {
            CharClass::Any => None,
            CharClass::Printable => Some('\u{7}'),
            CharClass::Alphanumeric => Some('!'),
            CharClass::Digits => Some('x'),
        }
    }

    fn narrowness(self) -> u8 {
        match self {
            CharClass::Any => 0,
            CharClass::Printable => 1,
            CharClass::Alphanumeric => 2,
            CharClass::Digits => 3,
        }
    }

    pub fn intersect(self, other: CharClass) -> CharClass {
        if self.narrowness() >= other.narrowness() {
            self
        } else {
            other
        }
    }
}

impl ValueDomain {
    /// The full signed integer line.
    pub fn int_full() -> ValueDomain {
        ValueDomain::IntRange {
            min: i64::MIN,
            max: i64::MAX,
        }
    }

    /// The full float line, NaN included.
    pub fn float_full() -> ValueDomain {
        ValueDomain::FloatRange {
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
            allow_nan: true,
        }
    }

    /// Any string up to the default length cap.
    pub fn string_any() -> ValueDomain {
        ValueDomain::StringPattern {
            min_len: 0,
            max_len: DEFAULT_MAX_LEN,
            char_class: CharClass::Any,
        }
    }

    /// Intersect with `other`. `None` means the intersection is empty or
    /// the variants are incompatible; the caller keeps the old domain.
    pub fn refine(&self, other: &ValueDomain) -> Option<ValueDomain> {
        match (self, other) {
            (ValueDomain::Unknown, d) => Some(d.clone()),
            (d, ValueDomain::Unknown) => Some(d.clone()),

            (
                ValueDomain::IntRange { min: a_min, max: a_max },
                ValueDomain::IntRange { min: b_min, max: b_max },
            ) => {
                let min = (*a_min).max(*b_min);
                let max = (*a_max).min(*b_max);
                (min <= max).then_some(ValueDomain::IntRange { min, max })
            }

            (
                ValueDomain::FloatRange { min: a_min, max: a_max, allow_nan: a_nan },
                ValueDomain::FloatRange { min: b_min, max: b_max, allow_nan: b_nan },
            ) => {
                let min = a_min.max(*b_min);
                let max = a_max.min(*b_max);
                (min <= max).then_some(ValueDomain::FloatRange {
                    min,
                    max,
                    allow_nan: *a_nan && *b_nan,
                })
            }

            (
                ValueDomain::StringPattern { min_len: a_min, max_len: a_max, char_class: a_cc },
                ValueDomain::StringPattern { min_len: b_min, max_len: b_max, char_class: b_cc },
            ) => {
                let min_len = (*a_min).max(*b_min);
                let max_len = (*a_max).min(*b_max);
                (min_len <= max_len).then_some(ValueDomain::StringPattern {
                    min_len,
                    max_len,
                    char_class: a_cc.intersect(*b_cc),
                })
            }

            (ValueDomain::Enum { values: a }, ValueDomain::Enum { values: b }) => {
                let values: Vec<String> =
                    a.iter().filter(|v| b.contains(v)).cloned().collect();
                (!values.is_empty()).then_some(ValueDomain::Enum { values })
            }

            (ValueDomain::Nullable { inner: a }, ValueDomain::Nullable { inner: b }) => {
                a.refine(b).map(|inner| ValueDomain::Nullable {
                    inner: Box::new(inner),
                })
            }
            // A non-nullable constraint strips the null.
            (ValueDomain::Nullable { inner }, d) => inner.refine(d),
            (d, ValueDomain::Nullable { inner }) => d.refine(inner),

            (ValueDomain::Composite { fields: a }, ValueDomain::Composite { fields: b }) => {
                let mut fields = a.clone();
                for (name, domain) in b {
                    match fields.get(name) {
                        Some(existing) => {
                            fields.insert(name.clone(), existing.refine(domain)?);
                        }
                        None => {
                            fields.insert(name.clone(), domain.clone());
                        }
                    }
                }
                Some(ValueDomain::Composite { fields })
            }

            _ => None,
        }
    }

    pub fn contains(&self, value: &Value) -> bool {
        match (self, value) {
            (ValueDomain::Unknown, _) => true,
            (ValueDomain::IntRange { min, max }, Value::Int(i)) => *i >= *min && *i <= *max,
            (ValueDomain::FloatRange { min, max, allow_nan }, Value::Float(f)) => {
                if f.is_nan() {
                    *allow_nan
                } else {
                    *f >= *min && *f <= *max
                }
            }
            (
                ValueDomain::StringPattern { min_len, max_len, char_class },
                Value::Str(s),
            ) => {
                let len = s.chars().count();
                len >= *min_len && len <= *max_len && s.chars().all(|c| char_class.contains(c))
            }
            (ValueDomain::Enum { values }, Value::Enum(v)) => values.iter().any(|x| x == v),
            (ValueDomain::Nullable { .. }, Value::Null) => true,
            (ValueDomain::Nullable { inner }, v) => inner.contains(v),
            (ValueDomain::Composite { fields }, Value::Composite(values)) => {
                values.keys().all(|k| fields.contains_key(k))
                    && fields.iter().all(|(name, domain)| {
                        values.get(name).is_some_and(|v| domain.contains(v))
                    })
            }
            _ => false,
        }
    }

    /// Number of distinct values, where countable.
    pub fn size_hint(&self) -> Option<u128> {
        match self {
            ValueDomain::IntRange { min, max } => {
                Some((*max as i128 - *min as i128 + 1) as u128)
            }
            ValueDomain::Enum { values } => Some(values.len() as u128),
            ValueDomain::Nullable { inner } => inner.size_hint().map(|n| n + 1),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        match self {
            ValueDomain::IntRange { .. } | ValueDomain::FloatRange { .. } => true,
            ValueDomain::Nullable { inner } => inner.is_numeric(),
            _ => false,
        }
    }

    pub fn contains_zero(&self) -> bool {
        match self {
            ValueDomain::IntRange { min, max } => *min <= 0 && *max >= 0,
            ValueDomain::FloatRange { min, max, .. } => *min <= 0.0 && *max >= 0.0,
            ValueDomain::Nullable { inner } => inner.contains_zero(),
            ValueDomain::Unknown => true,
            _ => false,
        }
    }

    /// True when no finite upper bound was ever inferred.
    pub fn unbounded_above(&self) -> bool {
        match self {
            ValueDomain::IntRange { max, .. } => *max == i64::MAX,
            ValueDomain::FloatRange { max, .. } => max.is_infinite(),
            ValueDomain::Nullable { inner } => inner.unbounded_above(),
            ValueDomain::Unknown => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for ValueDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueDomain::IntRange { min, max } => {
                if *min == i64::MIN && *max == i64::MAX {
                    write!(f, "int")
                } else {
                    write!(f, "int[{min}, {max}]")
                }
            }
            ValueDomain::FloatRange { min, max, allow_nan } => {
                write!(f, "float[{min}, {max}]")?;
                if *allow_nan {
                    write!(f, "+nan")?;
                }
                Ok(())
            }
            ValueDomain::StringPattern { min_len, max_len, char_class } => {
                write!(f, "str[{min_len}..{max_len}, {char_class:?}]")
            }
            ValueDomain::Enum { values } => write!(f, "enum{{{}}}", values.join(", ")),
            ValueDomain::Nullable { inner } => write!(f, "nullable<{inner}>"),
            ValueDomain::Composite { fields } => {
                write!(f, "{{")?;
                for (i, (name, domain)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {domain}")?;
                }
                write!(f, "}}")
            }
            ValueDomain::Unknown => write!(f, "unknown"),
        }
    }
}
