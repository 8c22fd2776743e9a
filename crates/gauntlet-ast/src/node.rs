use serde::{Deserialize, Serialize};

/// Body statements and expressions, flattened to the shapes the analyzers
/// consume: control flow with its comparison operands, raise sites with
/// their error kinds, and the handful of expression forms parameter usage
/// is read from. Front ends map anything else to `Opaque`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    If {
        cond: Box<Node>,
        then: Vec<Node>,
        #[serde(default)]
        orelse: Vec<Node>,
    },
    While {
        cond: Box<Node>,
        body: Vec<Node>,
    },
    For {
        count: Box<Node>,
        body: Vec<Node>,
    },
    Return {
        #[serde(default)]
        value: Option<Box<Node>>,
    },
    Raise {
        error: String,
        #[serde(default)]
        message: Option<String>,
    },
    Compare {
        op: CmpOp,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    BoolGroup {
        op: BoolOp,
        terms: Vec<Node>,
    },
    Binary {
        op: BinOp,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    Var {
        name: String,
    },
    Lit {
        value: LiteralNode,
    },
    Call {
        callee: String,
        args: Vec<Node>,
    },
    Index {
        base: Box<Node>,
        index: Box<Node>,
    },
    Len {
        of: Box<Node>,
    },
    Opaque {
        #[serde(default)]
        what: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoolOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

/// Literal constants. Untagged: JSON `null`, booleans, numbers and strings
/// map directly; integers are tried before floats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LiteralNode {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl CmpOp {
    /// The comparison with operands swapped: `a < b` ⇔ `b > a`.
    pub fn flipped(self) -> CmpOp {
        match self {
            CmpOp::Eq => CmpOp::Eq,
            CmpOp::Ne => CmpOp::Ne,
            CmpOp::Lt => CmpOp::Gt,
            CmpOp::Le => CmpOp::Ge,
            CmpOp::Gt => CmpOp::Lt,
            CmpOp::Ge => CmpOp::Le,
        }
    }

    /// The comparison satisfied exactly when `self` is not: the guard's
    /// rejected side.
    pub fn negated(self) -> CmpOp {
        match self {
            CmpOp::Eq => CmpOp::Ne,
            CmpOp::Ne => CmpOp::Eq,
            CmpOp::Lt => CmpOp::Ge,
            CmpOp::Le => CmpOp::Gt,
            CmpOp::Gt => CmpOp::Le,
            CmpOp::Ge => CmpOp::Lt,
        }
    }
}

impl Node {
    /// Variables read anywhere inside this node, in first-seen order.
    pub fn referenced_vars(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_vars(&mut out);
        out
    }

    fn collect_vars(&self, out: &mut Vec<String>) {
        let mut push = |name: &str| {
            if !out.iter().any(|n| n == name) {
                out.push(name.to_string());
            }
        };
        match self {
            Node::Var { name } => push(name),
            Node::If { cond, then, orelse } => {
                cond.collect_vars(out);
                for n in then.iter().chain(orelse) {
                    n.collect_vars(out);
                }
            }
            Node::While { cond, body } => {
                cond.collect_vars(out);
                for n in body {
                    n.collect_vars(out);
                }
            }
            Node::For { count, body } => {
                count.collect_vars(out);
                for n in body {
                    n.collect_vars(out);
                }
            }
            Node::Return { value } => {
                if let Some(v) = value {
                    v.collect_vars(out);
                }
            }
            Node::Compare { lhs, rhs, .. } | Node::Binary { lhs, rhs, .. } => {
                lhs.collect_vars(out);
                rhs.collect_vars(out);
            }
            Node::BoolGroup { terms, .. } => {
                for n in terms {
                    n.collect_vars(out);
                }
            }
            Node::Call { args, .. } => {
                for n in args {
                    n.collect_vars(out);
                }
            }
            Node::Index { base, index } => {
                base.collect_vars(out);
                index.collect_vars(out);
            }
            Node::Len { of } => of.collect_vars(out),
            Node::Raise { .. } | Node::Lit { .. } | Node::Opaque { .. } => {}
        }
    }
}
