//! Single-pass domain inference over a callable's guard edges.
//!
//! One pass, refinement only: every edge can intersect a domain but never
//! widen one, so termination is immediate and order-independent up to
//! which contradiction is reported first. Edges the walker could not
//! resolve arrive opaque and become inference gaps; the affected domain
//! keeps whatever precision it already had.

use log::debug;
use serde::{Deserialize, Serialize};

use gauntlet_ast::node::CmpOp;
use gauntlet_extract::{FlowEdge, Operand};
use gauntlet_profile::{
    FunctionSignature, ParamRelation, RejectAction, Rejection, RelationOperand,
};

use crate::narrow::{narrow_by_len, narrow_by_literal, Narrowed};

/// A constraint the engine saw but could not use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceGap {
    pub what: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct InferenceReport {
    pub signature: FunctionSignature,
    pub gaps: Vec<InferenceGap>,
}

/// Attach inferred domains to an extracted signature.
pub fn infer(mut signature: FunctionSignature, edges: &[FlowEdge]) -> InferenceReport {
    let mut gaps = Vec::new();

    for edge in edges {
        match edge {
            FlowEdge::Guard { param, op, operand, on_reject } => {
                apply_guard(&mut signature, param, *op, operand, on_reject, &mut gaps);
            }
            FlowEdge::LenGuard { param, op, len, on_reject } => {
                apply_len_guard(&mut signature, param, *op, *len, on_reject, &mut gaps);
            }
            FlowEdge::Opaque { what } => {
                debug!("inference gap: {what}");
                gaps.push(InferenceGap {
                    what: what.clone(),
                    reason: "control flow not analyzable".to_string(),
                });
            }
        }
    }

    InferenceReport { signature, gaps }
}

fn apply_guard(
    signature: &mut FunctionSignature,
    param: &str,
    op: CmpOp,
    operand: &Operand,
    on_reject: &RejectAction,
    gaps: &mut Vec<InferenceGap>,
) {
    match operand {
        Operand::Literal(value) => {
            // Comparisons on paths that never exit carry no narrowing
            // force; the extractor already recorded the literal.
            if *on_reject == RejectAction::FallThrough {
                return;
            }
            let rendered = format!("{param} {} {value}", symbol(op.negated()));
            let Some(profile) = signature.param_mut(param) else {
                return;
            };
            match narrow_by_literal(&profile.domain, op, value) {
                Narrowed::Domain(domain) => {
                    debug!("{param}: narrowed to {domain}");
                    profile.domain = domain;
                }
                Narrowed::Unchanged => {}
                Narrowed::Contradiction => {
                    debug!("{param}: guard contradicts domain {}", profile.domain);
                    gaps.push(InferenceGap {
                        what: format!("{param} {} {value}", symbol(op)),
                        reason: format!("contradicts inferred domain {}", profile.domain),
                    });
                }
            }
            profile.rejected.push(Rejection {
                constraint: rendered,
                action: on_reject.clone(),
            });
        }
        Operand::Param { name } => {
            record_relation(
                signature,
                param,
                op,
                RelationOperand::Param { name: name.clone() },
                on_reject,
                name,
            );
        }
        Operand::LenOf { name } => {
            record_relation(
                signature,
                param,
                op,
                RelationOperand::LenOf { name: name.clone() },
                on_reject,
                &format!("len({name})"),
            );
        }
    }
}

/// Param-vs-param guards cannot interval-narrow; keep them structured so
/// the pattern matchers can consult them.
fn record_relation(
    signature: &mut FunctionSignature,
    param: &str,
    op: CmpOp,
    rhs: RelationOperand,
    on_reject: &RejectAction,
    rendered_rhs: &str,
) {
    signature.relations.push(ParamRelation {
        lhs: param.to_string(),
        op,
        rhs,
    });
    if *on_reject != RejectAction::FallThrough {
        let constraint = format!("{param} {} {rendered_rhs}", symbol(op.negated()));
        if let Some(profile) = signature.param_mut(param) {
            profile.rejected.push(Rejection {
                constraint,
                action: on_reject.clone(),
            });
        }
    }
}

fn apply_len_guard(
    signature: &mut FunctionSignature,
    param: &str,
    op: CmpOp,
    len: i64,
    on_reject: &RejectAction,
    gaps: &mut Vec<InferenceGap>,
) {
    if *on_reject == RejectAction::FallThrough {
        return;
    }
    let rendered = format!("len({param}) {} {len}", symbol(op.negated()));
    let Some(profile) = signature.param_mut(param) else {
        return;
    };
    match narrow_by_len(&profile.domain, op, len) {
        Narrowed::Domain(domain) => {
            debug!("{param}: narrowed to {domain}");
            profile.domain = domain;
        }
        Narrowed::Unchanged => {}
        Narrowed::Contradiction => {
            gaps.push(InferenceGap {
                what: format!("len({param}) {} {len}", symbol(op)),
                reason: format!("contradicts inferred domain {}", profile.domain),
            });
        }
    }
    profile.rejected.push(Rejection {
        constraint: rendered,
        action: on_reject.clone(),
    });
}

fn symbol(op: CmpOp) -> &'static str {
    match op {
        CmpOp::Eq => "==",
        CmpOp::Ne => "!=",
        CmpOp::Lt => "<",
        CmpOp::Le => "<=",
        CmpOp::Gt => ">",
        CmpOp::Ge => ">=",
    }
}
