//! Pairwise combination of per-parameter edge values.
//!
//! The Cartesian product of edge lists is exponential in parameter count;
//! all-pairs coverage is the classic polynomial substitute: every pair of
//! edge values from distinct parameters must co-occur in at least one
//! generated tuple. The construction is a greedy cover seeded from the
//! first uncovered pair, so identical inputs always produce identical
//! tuples in identical order.

use std::collections::{BTreeMap, HashSet};

use gauntlet_profile::Value;

/// A pair of parameter assignments that must co-occur in some tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValuePair {
    pub param1: String,
    pub val1: Value,
    pub param2: String,
    pub val2: Value,
}

/// Every pair of values from distinct axes, in axis order.
pub fn all_pairs(axes: &[(String, Vec<Value>)]) -> Vec<ValuePair> {
    let mut pairs = Vec::new();
    for i in 0..axes.len() {
        for j in (i + 1)..axes.len() {
            for v1 in &axes[i].1 {
                for v2 in &axes[j].1 {
                    pairs.push(ValuePair {
                        param1: axes[i].0.clone(),
                        val1: v1.clone(),
                        param2: axes[j].0.clone(),
                        val2: v2.clone(),
                    });
                }
            }
        }
    }
    pairs
}

/// Build a deterministic set of tuples covering every pair.
///
/// Each round seeds a tuple from the first still-uncovered pair, then
/// fills the remaining axes in declaration order, choosing the value that
/// covers the most uncovered pairs against the assignments made so far
/// (first value wins ties). The seed pair guarantees progress every
/// round. Every axis must carry at least one value.
pub fn cover(axes: &[(String, Vec<Value>)]) -> Vec<BTreeMap<String, Value>> {
    match axes.len() {
        0 => Vec::new(),
        1 => axes[0]
            .1
            .iter()
            .map(|v| {
                let mut tuple = BTreeMap::new();
                tuple.insert(axes[0].0.clone(), v.clone());
                tuple
            })
            .collect(),
        _ => greedy_cover(axes),
    }
}

fn greedy_cover(axes: &[(String, Vec<Value>)]) -> Vec<BTreeMap<String, Value>> {
    let order: BTreeMap<&str, usize> = axes
        .iter()
        .enumerate()
        .map(|(i, (name, _))| (name.as_str(), i))
        .collect();

    let mut remaining = all_pairs(axes);
    let mut open: HashSet<ValuePair> = remaining.iter().cloned().collect();
    let mut tuples = Vec::new();

    while let Some(seed) = remaining.first().cloned() {
        let mut tuple = BTreeMap::new();
        tuple.insert(seed.param1, seed.val1);
        tuple.insert(seed.param2, seed.val2);

        for (name, values) in axes {
            if tuple.contains_key(name) {
                continue;
            }
            let mut best = &values[0];
            let mut best_gain = pair_gain(&order, &open, &tuple, name, best);
            for value in &values[1..] {
                let gain = pair_gain(&order, &open, &tuple, name, value);
                if gain > best_gain {
                    best = value;
                    best_gain = gain;
                }
            }
            tuple.insert(name.clone(), best.clone());
        }

        for pair in pairs_of(&order, &tuple) {
            open.remove(&pair);
        }
        remaining.retain(|p| open.contains(p));
        tuples.push(tuple);
    }

    tuples
}

/// How many uncovered pairs assigning `value` to `param` would cover,
/// given the assignments already in the tuple.
fn pair_gain(
    order: &BTreeMap<&str, usize>,
    open: &HashSet<ValuePair>,
    tuple: &BTreeMap<String, Value>,
    param: &str,
    value: &Value,
) -> usize {
    tuple
        .iter()
        .filter(|(other, other_val)| {
            open.contains(&oriented_pair(order, param, value, other, other_val))
        })
        .count()
}

/// All pairs a complete tuple covers.
fn pairs_of(order: &BTreeMap<&str, usize>, tuple: &BTreeMap<String, Value>) -> Vec<ValuePair> {
    let entries: Vec<(&String, &Value)> = tuple.iter().collect();
    let mut pairs = Vec::new();
    for i in 0..entries.len() {
        for j in (i + 1)..entries.len() {
            pairs.push(oriented_pair(
                order,
                entries[i].0,
                entries[i].1,
                entries[j].0,
                entries[j].1,
            ));
        }
    }
    pairs
}

/// Pairs are stored with their params in axis-declaration order.
fn oriented_pair(
    order: &BTreeMap<&str, usize>,
    param_a: &str,
    val_a: &Value,
    param_b: &str,
    val_b: &Value,
) -> ValuePair {
    if order.get(param_a) <= order.get(param_b) {
        ValuePair {
            param1: param_a.to_string(),
            val1: val_a.clone(),
            param2: param_b.to_string(),
            val2: val_b.clone(),
        }
    } else {
        ValuePair {
            param1: param_b.to_string(),
            val1: val_b.clone(),
            param2: param_a.to_string(),
            val2: val_a.clone(),
        }
    }
}

/// Which of `targets` the tuples actually hit.
pub fn check_pairs(
    tuples: &[BTreeMap<String, Value>],
    targets: &[ValuePair],
) -> HashSet<ValuePair> {
    let mut covered = HashSet::new();
    for target in targets {
        if tuples.iter().any(|t| {
            t.get(&target.param1) == Some(&target.val1)
                && t.get(&target.param2) == Some(&target.val2)
        }) {
            covered.insert(target.clone());
        }
    }
    covered
}
