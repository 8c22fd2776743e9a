//! Flattens a callable body into guard edges for domain inference.
//!
//! Each edge states the constraint the surviving path satisfies and what
//! happens to inputs the guard turns away. Conjunctions split into one
//! edge per term; a negated disjunction does the same (De Morgan), so
//! `if a < 0 or a > 100: raise` yields both bounds. Loop bodies are not
//! unrolled: every loop contributes a single opaque edge and its header
//! comparison, nothing more. Anything the walker cannot see through
//! becomes an opaque edge the inference engine logs as a gap.

use std::collections::HashSet;

use gauntlet_ast::node::{BoolOp, CmpOp, Node};
use gauntlet_ast::types::CallableDecl;
use gauntlet_profile::{RejectAction, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum FlowEdge {
    /// The surviving path satisfies `param op operand`.
    Guard {
        param: String,
        op: CmpOp,
        operand: Operand,
        on_reject: RejectAction,
    },
    /// The surviving path satisfies `len(param) op len`.
    LenGuard {
        param: String,
        op: CmpOp,
        len: i64,
        on_reject: RejectAction,
    },
    /// Control flow the walker cannot see through.
    Opaque { what: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(Value),
    Param { name: String },
    LenOf { name: String },
}

pub fn flow_edges(decl: &CallableDecl) -> Vec<FlowEdge> {
    let params: HashSet<&str> = decl.params.iter().map(|p| p.name.as_str()).collect();
    let mut edges = Vec::new();
    walk_stmts(&decl.body, &params, &mut edges);
    edges
}

fn walk_stmts(stmts: &[Node], params: &HashSet<&str>, edges: &mut Vec<FlowEdge>) {
    for node in stmts {
        match node {
            Node::If { cond, then, orelse } => {
                if let Some(action) = exit_action(then) {
                    // The guard turns the condition away; survivors satisfy
                    // its negation.
                    push_cond(cond, params, true, action, edges);
                    walk_stmts(orelse, params, edges);
                } else if let Some(action) = exit_action(orelse) {
                    push_cond(cond, params, false, action, edges);
                    walk_stmts(then, params, edges);
                } else {
                    // Neither side exits: record the comparison without
                    // narrowing force.
                    push_cond(cond, params, false, RejectAction::FallThrough, edges);
                    walk_stmts(then, params, edges);
                    walk_stmts(orelse, params, edges);
                }
            }
            Node::While { cond, .. } => {
                push_cond(cond, params, false, RejectAction::FallThrough, edges);
                edges.push(FlowEdge::Opaque {
                    what: "while body".to_string(),
                });
            }
            Node::For { .. } => {
                edges.push(FlowEdge::Opaque {
                    what: "for body".to_string(),
                });
            }
            Node::Opaque { what } => {
                let what = if what.is_empty() { "statement" } else { what };
                edges.push(FlowEdge::Opaque {
                    what: what.to_string(),
                });
            }
            _ => {}
        }
    }
}

/// Decompose a branch condition into guard edges. `negate` means the
/// surviving path satisfies the condition's negation.
fn push_cond(
    cond: &Node,
    params: &HashSet<&str>,
    negate: bool,
    action: RejectAction,
    edges: &mut Vec<FlowEdge>,
) {
    match cond {
        Node::Compare { op, lhs, rhs } => match normalize(*op, lhs, rhs, params) {
            Some(Normalized::Value { param, op, operand }) => {
                let op = if negate { op.negated() } else { op };
                edges.push(FlowEdge::Guard {
                    param,
                    op,
                    operand,
                    on_reject: action,
                });
            }
            Some(Normalized::Length { param, op, len }) => {
                let op = if negate { op.negated() } else { op };
                edges.push(FlowEdge::LenGuard {
                    param,
                    op,
                    len,
                    on_reject: action,
                });
            }
            None => edges.push(FlowEdge::Opaque {
                what: "unresolved comparison".to_string(),
            }),
        },
        Node::BoolGroup { op: BoolOp::And, terms } if !negate => {
            for term in terms {
                push_cond(term, params, false, action.clone(), edges);
            }
        }
        // !(A or B) = !A and !B, so each term still narrows on its own.
        Node::BoolGroup { op: BoolOp::Or, terms } if negate => {
            for term in terms {
                push_cond(term, params, true, action.clone(), edges);
            }
        }
        Node::BoolGroup { .. } => edges.push(FlowEdge::Opaque {
            what: "disjunctive constraint".to_string(),
        }),
        Node::Var { .. } => edges.push(FlowEdge::Opaque {
            what: "truthiness test".to_string(),
        }),
        _ => edges.push(FlowEdge::Opaque {
            what: "unsupported condition".to_string(),
        }),
    }
}

enum Normalized {
    Value {
        param: String,
        op: CmpOp,
        operand: Operand,
    },
    Length {
        param: String,
        op: CmpOp,
        len: i64,
    },
}

/// Rewrite a comparison so the parameter sits on the left.
fn normalize(op: CmpOp, lhs: &Node, rhs: &Node, params: &HashSet<&str>) -> Option<Normalized> {
    match (lhs, rhs) {
        (Node::Var { name }, rhs) if params.contains(name.as_str()) => {
            let operand = match rhs {
                Node::Lit { value } => Operand::Literal(value.into()),
                Node::Var { name: other } if params.contains(other.as_str()) => {
                    Operand::Param {
                        name: other.clone(),
                    }
                }
                Node::Len { of } => match of.as_ref() {
                    Node::Var { name: other } if params.contains(other.as_str()) => {
                        Operand::LenOf {
                            name: other.clone(),
                        }
                    }
                    _ => return None,
                },
                _ => return None,
            };
            Some(Normalized::Value {
                param: name.clone(),
                op,
                operand,
            })
        }
        (Node::Lit { value }, Node::Var { name }) if params.contains(name.as_str()) => {
            Some(Normalized::Value {
                param: name.clone(),
                op: op.flipped(),
                operand: Operand::Literal(value.into()),
            })
        }
        (Node::Len { of }, Node::Lit { value }) => {
            let Node::Var { name } = of.as_ref() else {
                return None;
            };
            if !params.contains(name.as_str()) {
                return None;
            }
            let gauntlet_ast::node::LiteralNode::Int(len) = value else {
                return None;
            };
            Some(Normalized::Length {
                param: name.clone(),
                op,
                len: *len,
            })
        }
        (Node::Lit { value }, Node::Len { of }) => {
            let Node::Var { name } = of.as_ref() else {
                return None;
            };
            if !params.contains(name.as_str()) {
                return None;
            }
            let gauntlet_ast::node::LiteralNode::Int(len) = value else {
                return None;
            };
            Some(Normalized::Length {
                param: name.clone(),
                op: op.flipped(),
                len: *len,
            })
        }
        _ => None,
    }
}

/// Whether a branch leaves the callable, and how.
fn exit_action(stmts: &[Node]) -> Option<RejectAction> {
    for node in stmts {
        match node {
            Node::Raise { error, .. } => {
                return Some(RejectAction::Raise {
                    error: error.clone(),
                })
            }
            Node::Return { .. } => return Some(RejectAction::Return),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauntlet_ast::parse::parse_unit;

    fn edges_for(json: &str, name: &str) -> Vec<FlowEdge> {
        let unit = parse_unit(json).unwrap();
        flow_edges(unit.find_callable(name).unwrap())
    }

    const GUARDED: &str = r#"{
        "path": "m",
        "callables": [
            {
                "name": "divide",
                "params": [
                    { "name": "a", "hint": { "type": "int" } },
                    { "name": "b", "hint": { "type": "int" } }
                ],
                "body": [
                    {
                        "kind": "if",
                        "cond": {
                            "kind": "compare", "op": "eq",
                            "lhs": { "kind": "var", "name": "b" },
                            "rhs": { "kind": "lit", "value": 0 }
                        },
                        "then": [ { "kind": "raise", "error": "ZeroDivisionError" } ]
                    }
                ]
            },
            {
                "name": "bounded",
                "params": [ { "name": "x", "hint": { "type": "int" } } ],
                "body": [
                    {
                        "kind": "if",
                        "cond": {
                            "kind": "bool_group", "op": "or",
                            "terms": [
                                {
                                    "kind": "compare", "op": "lt",
                                    "lhs": { "kind": "var", "name": "x" },
                                    "rhs": { "kind": "lit", "value": 0 }
                                },
                                {
                                    "kind": "compare", "op": "gt",
                                    "lhs": { "kind": "var", "name": "x" },
                                    "rhs": { "kind": "lit", "value": 100 }
                                }
                            ]
                        },
                        "then": [ { "kind": "raise", "error": "ValueError" } ]
                    }
                ]
            },
            {
                "name": "capped",
                "params": [ { "name": "s", "hint": { "type": "str" } } ],
                "body": [
                    {
                        "kind": "if",
                        "cond": {
                            "kind": "compare", "op": "gt",
                            "lhs": { "kind": "len", "of": { "kind": "var", "name": "s" } },
                            "rhs": { "kind": "lit", "value": 32 }
                        },
                        "then": [ { "kind": "raise", "error": "ValueError" } ]
                    }
                ]
            },
            {
                "name": "looped",
                "params": [ { "name": "n", "hint": { "type": "int" } } ],
                "body": [
                    {
                        "kind": "for",
                        "count": { "kind": "var", "name": "n" },
                        "body": [
                            {
                                "kind": "if",
                                "cond": {
                                    "kind": "compare", "op": "gt",
                                    "lhs": { "kind": "var", "name": "n" },
                                    "rhs": { "kind": "lit", "value": 5 }
                                },
                                "then": [ { "kind": "raise", "error": "ValueError" } ]
                            }
                        ]
                    }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_raise_guard_negates_condition() {
        let edges = edges_for(GUARDED, "divide");
        assert_eq!(
            edges,
            vec![FlowEdge::Guard {
                param: "b".into(),
                op: CmpOp::Ne,
                operand: Operand::Literal(Value::Int(0)),
                on_reject: RejectAction::Raise {
                    error: "ZeroDivisionError".into()
                },
            }]
        );
    }

    #[test]
    fn test_negated_disjunction_splits_into_bounds() {
        let edges = edges_for(GUARDED, "bounded");
        assert_eq!(edges.len(), 2);
        assert_eq!(
            edges[0],
            FlowEdge::Guard {
                param: "x".into(),
                op: CmpOp::Ge,
                operand: Operand::Literal(Value::Int(0)),
                on_reject: RejectAction::Raise {
                    error: "ValueError".into()
                },
            }
        );
        assert_eq!(
            edges[1],
            FlowEdge::Guard {
                param: "x".into(),
                op: CmpOp::Le,
                operand: Operand::Literal(Value::Int(100)),
                on_reject: RejectAction::Raise {
                    error: "ValueError".into()
                },
            }
        );
    }

    #[test]
    fn test_length_guard() {
        let edges = edges_for(GUARDED, "capped");
        assert_eq!(
            edges,
            vec![FlowEdge::LenGuard {
                param: "s".into(),
                op: CmpOp::Le,
                len: 32,
                on_reject: RejectAction::Raise {
                    error: "ValueError".into()
                },
            }]
        );
    }

    #[test]
    fn test_loop_body_is_one_opaque_edge() {
        let edges = edges_for(GUARDED, "looped");
        assert_eq!(
            edges,
            vec![FlowEdge::Opaque {
                what: "for body".into()
            }]
        );
    }

    #[test]
    fn test_literal_on_left_flips() {
        let json = r#"{
            "path": "m",
            "callables": [
                {
                    "name": "f",
                    "params": [ { "name": "x", "hint": { "type": "int" } } ],
                    "body": [
                        {
                            "kind": "if",
                            "cond": {
                                "kind": "compare", "op": "gt",
                                "lhs": { "kind": "lit", "value": 50 },
                                "rhs": { "kind": "var", "name": "x" }
                            },
                            "then": [ { "kind": "raise", "error": "ValueError" } ]
                        }
                    ]
                }
            ]
        }"#;
        // 50 > x rejects, so survivors satisfy x >= 50.
        let edges = edges_for(json, "f");
        assert_eq!(
            edges,
            vec![FlowEdge::Guard {
                param: "x".into(),
                op: CmpOp::Ge,
                operand: Operand::Literal(Value::Int(50)),
                on_reject: RejectAction::Raise {
                    error: "ValueError".into()
                },
            }]
        );
    }

    #[test]
    fn test_param_vs_param_kept_structured() {
        let json = r#"{
            "path": "m",
            "callables": [
                {
                    "name": "lookup",
                    "params": [
                        { "name": "items", "hint": { "type": "list" } },
                        { "name": "idx", "hint": { "type": "int" } }
                    ],
                    "body": [
                        {
                            "kind": "if",
                            "cond": {
                                "kind": "compare", "op": "ge",
                                "lhs": { "kind": "var", "name": "idx" },
                                "rhs": { "kind": "len", "of": { "kind": "var", "name": "items" } }
                            },
                            "then": [ { "kind": "raise", "error": "IndexError" } ]
                        }
                    ]
                }
            ]
        }"#;
        let edges = edges_for(json, "lookup");
        assert_eq!(
            edges,
            vec![FlowEdge::Guard {
                param: "idx".into(),
                op: CmpOp::Lt,
                operand: Operand::LenOf {
                    name: "items".into()
                },
                on_reject: RejectAction::Raise {
                    error: "IndexError".into()
                },
            }]
        );
    }

    #[test]
    fn test_unresolved_comparison_is_opaque() {
        let json = r#"{
            "path": "m",
            "callables": [
                {
                    "name": "f",
                    "params": [ { "name": "x", "hint": { "type": "int" } } ],
                    "body": [
                        {
                            "kind": "if",
                            "cond": {
                                "kind": "compare", "op": "gt",
                                "lhs": { "kind": "call", "callee": "g", "args": [ { "kind": "var", "name": "x" } ] },
                                "rhs": { "kind": "lit", "value": 0 }
                            },
                            "then": [ { "kind": "raise", "error": "ValueError" } ]
                        }
                    ]
                }
            ]
        }"#;
        let edges = edges_for(json, "f");
        assert!(matches!(edges[0], FlowEdge::Opaque { .. }));
    }
}
