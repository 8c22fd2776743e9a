//! Builds a `FunctionSignature` from a callable declaration.
//!
//! Seeding is hint-driven and soft: a missing or unrecognized hint leaves
//! the parameter at `Unknown` rather than failing. The body walk collects
//! raise sites with their guard text, every literal a parameter is
//! compared against, cyclomatic complexity, and the usage roles the
//! failure patterns key off.

use std::collections::{BTreeMap, BTreeSet};

use gauntlet_ast::node::{BinOp, CmpOp, Node};
use gauntlet_ast::types::{CallableDecl, TypeHint};
use gauntlet_profile::{
    ErrorCondition, FunctionSignature, ParameterProfile, UsageRole, Value, ValueDomain,
};

/// Callees treated as allocations when sizing their arguments.
const ALLOC_CALLEES: &[&str] = &[
    "alloc",
    "with_capacity",
    "reserve",
    "repeat",
    "resize",
    "zeros",
    "bytearray",
];

pub fn extract(decl: &CallableDecl, unit_path: &str) -> FunctionSignature {
    let mut params: Vec<ParameterProfile> = decl
        .params
        .iter()
        .map(|p| {
            let mut profile = ParameterProfile {
                name: p.name.clone(),
                hint: p.hint.clone(),
                domain: seed_domain(p.hint.as_ref()),
                observed: BTreeSet::new(),
                rejected: Vec::new(),
                roles: BTreeSet::new(),
            };
            if let Some(default) = &p.default {
                profile.observed.insert(Value::from(default));
            }
            profile
        })
        .collect();

    let mut observed: BTreeMap<String, BTreeSet<Value>> = BTreeMap::new();
    let mut roles: BTreeMap<String, BTreeSet<UsageRole>> = BTreeMap::new();
    let mut errors = BTreeSet::new();
    for node in &decl.body {
        walk(node, &mut observed, &mut roles, &mut errors);
    }

    for profile in &mut params {
        if let Some(values) = observed.remove(&profile.name) {
            profile.observed.extend(values);
        }
        if let Some(r) = roles.remove(&profile.name) {
            profile.roles.extend(r);
        }
    }

    FunctionSignature {
        qualified_name: decl.qualified_name(unit_path),
        params,
        return_hint: decl.return_hint.clone(),
        error_conditions: errors,
        relations: Vec::new(),
        complexity: 1 + decl.body.iter().map(node_complexity).sum::<u32>(),
        is_async: decl.is_async,
    }
}

fn seed_domain(hint: Option<&TypeHint>) -> ValueDomain {
    match hint {
        Some(TypeHint::Int) => ValueDomain::int_full(),
        Some(TypeHint::Float) => ValueDomain::float_full(),
        Some(TypeHint::Str) => ValueDomain::string_any(),
        Some(TypeHint::Bool) => ValueDomain::Enum {
            values: vec!["false".to_string(), "true".to_string()],
        },
        Some(TypeHint::Optional { inner }) => ValueDomain::Nullable {
            inner: Box::new(seed_domain(Some(inner))),
        },
        // Collections and named types carry no usable structure yet.
        Some(TypeHint::List) | Some(TypeHint::Map) | Some(TypeHint::Named { .. }) | None => {
            ValueDomain::Unknown
        }
    }
}

/// One pass over the body collecting compared literals, usage roles and
/// raise sites. Descends everywhere, loop bodies included; whether a
/// comparison can narrow is the inference engine's concern, not this one's.
fn walk(
    node: &Node,
    observed: &mut BTreeMap<String, BTreeSet<Value>>,
    roles: &mut BTreeMap<String, BTreeSet<UsageRole>>,
    errors: &mut BTreeSet<ErrorCondition>,
) {
    match node {
        Node::If { cond, then, orelse } => {
            walk(cond, observed, roles, errors);
            collect_guarded_raises(cond, then, errors);
            for n in then.iter().chain(orelse) {
                walk(n, observed, roles, errors);
            }
        }
        Node::While { cond, body } => {
            walk(cond, observed, roles, errors);
            for name in cond.referenced_vars() {
                roles.entry(name).or_default().insert(UsageRole::LoopBound);
            }
            for n in body {
                walk(n, observed, roles, errors);
            }
        }
        Node::For { count, body } => {
            walk(count, observed, roles, errors);
            for name in count.referenced_vars() {
                roles.entry(name).or_default().insert(UsageRole::LoopBound);
            }
            for n in body {
                walk(n, observed, roles, errors);
            }
        }
        Node::Compare { lhs, rhs, .. } => {
            record_compared_literal(lhs, rhs, observed);
            record_compared_literal(rhs, lhs, observed);
            walk(lhs, observed, roles, errors);
            walk(rhs, observed, roles, errors);
        }
        Node::Binary { op, lhs, rhs } => {
            if matches!(op, BinOp::Div | BinOp::Mod) {
                if let Node::Var { name } = rhs.as_ref() {
                    roles
                        .entry(name.clone())
                        .or_default()
                        .insert(UsageRole::Divisor);
                }
            }
            walk(lhs, observed, roles, errors);
            walk(rhs, observed, roles, errors);
        }
        Node::Index { base, index } => {
            for name in index.referenced_vars() {
                roles.entry(name).or_default().insert(UsageRole::IndexBound);
            }
            walk(base, observed, roles, errors);
            walk(index, observed, roles, errors);
        }
        Node::Call { callee, args } => {
            let tail = callee.rsplit('.').next().unwrap_or(callee);
            if ALLOC_CALLEES.contains(&tail) {
                for arg in args {
                    for name in arg.referenced_vars() {
                        roles.entry(name).or_default().insert(UsageRole::AllocSize);
                    }
                }
            }
            for arg in args {
                walk(arg, observed, roles, errors);
            }
        }
        Node::Raise { error, message } => {
            // Guarded raises were already recorded with their condition as
            // evidence; don't shadow that with the bare message.
            if !errors.iter().any(|c| c.kind == *error) {
                errors.insert(ErrorCondition {
                    kind: error.clone(),
                    evidence: message
                        .clone()
                        .unwrap_or_else(|| "unconditional".to_string()),
                });
            }
        }
        Node::BoolGroup { terms, .. } => {
            for n in terms {
                walk(n, observed, roles, errors);
            }
        }
        Node::Return { value } => {
            if let Some(v) = value {
                walk(v, observed, roles, errors);
            }
        }
        Node::Len { of } => walk(of, observed, roles, errors),
        Node::Var { .. } | Node::Lit { .. } | Node::Opaque { .. } => {}
    }
}

/// Raises directly guarded by a condition carry that condition as
/// evidence; the inner walk then skips its bare-message entry.
fn collect_guarded_raises(cond: &Node, then: &[Node], errors: &mut BTreeSet<ErrorCondition>) {
    for node in then {
        if let Node::Raise { error, .. } = node {
            errors.insert(ErrorCondition {
                kind: error.clone(),
                evidence: render(cond),
            });
        }
    }
}

fn record_compared_literal(
    side: &Node,
    other: &Node,
    observed: &mut BTreeMap<String, BTreeSet<Value>>,
) {
    if let (Node::Var { name }, Node::Lit { value }) = (side, other) {
        observed
            .entry(name.clone())
            .or_default()
            .insert(Value::from(value));
    }
}

fn node_complexity(node: &Node) -> u32 {
    match node {
        Node::If { cond, then, orelse } => {
            1 + node_complexity(cond)
                + then.iter().map(node_complexity).sum::<u32>()
                + orelse.iter().map(node_complexity).sum::<u32>()
        }
        Node::While { cond, body } => {
            1 + node_complexity(cond) + body.iter().map(node_complexity).sum::<u32>()
        }
        Node::For { count, body } => {
            1 + node_complexity(count) + body.iter().map(node_complexity).sum::<u32>()
        }
        Node::BoolGroup { terms, .. } => {
            terms.len().saturating_sub(1) as u32
                + terms.iter().map(node_complexity).sum::<u32>()
        }
        Node::Compare { lhs, rhs, .. } | Node::Binary { lhs, rhs, .. } => {
            node_complexity(lhs) + node_complexity(rhs)
        }
        Node::Return { value } => value.as_ref().map_or(0, |v| node_complexity(v)),
        Node::Call { args, .. } => args.iter().map(node_complexity).sum(),
        Node::Index { base, index } => node_complexity(base) + node_complexity(index),
        Node::Len { of } => node_complexity(of),
        _ => 0,
    }
}

/// Render a condition the way a reader would write it, for evidence text.
fn render(node: &Node) -> String {
    match node {
        Node::Var { name } => name.clone(),
        Node::Lit { value } => Value::from(value).to_string(),
        Node::Compare { op, lhs, rhs } => {
            format!("{} {} {}", render(lhs), cmp_symbol(*op), render(rhs))
        }
        Node::Binary { op, lhs, rhs } => {
            let sym = match op {
                BinOp::Add => "+",
                BinOp::Sub => "-",
                BinOp::Mul => "*",
                BinOp::Div => "/",
                BinOp::Mod => "%",
            };
            format!("{} {sym} {}", render(lhs), render(rhs))
        }
        Node::BoolGroup { op, terms } => {
            let joint = match op {
                gauntlet_ast::node::BoolOp::And => " and ",
                gauntlet_ast::node::BoolOp::Or => " or ",
            };
            terms.iter().map(render).collect::<Vec<_>>().join(joint)
        }
        Node::Len { of } => format!("len({})", render(of)),
        Node::Index { base, index } => format!("{}[{}]", render(base), render(index)),
        Node::Call { callee, args } => {
            let args = args.iter().map(render).collect::<Vec<_>>().join(", ");
            format!("{callee}({args})")
        }
        _ => "...".to_string(),
    }
}

fn cmp_symbol(op: CmpOp) -> &'static str {
    match op {
        CmpOp::Eq => "==",
        CmpOp::Ne => "!=",
        CmpOp::Lt => "<",
        CmpOp::Le => "<=",
        CmpOp::Gt => ">",
        CmpOp::Ge => ">=",
    }
}
