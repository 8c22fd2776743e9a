use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use gauntlet_ast::node::CmpOp;
use gauntlet_ast::types::TypeHint;

use crate::domain::ValueDomain;
use crate::value::Value;

/// Everything the analyzers learned about one callable: parameter
/// profiles, declared error conditions, cross-parameter relations and a
/// complexity score. Treated as immutable once inference has attached
/// final domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub qualified_name: String,
    pub params: Vec<ParameterProfile>,
    #[serde(default)]
    pub return_hint: Option<TypeHint>,
    /// Named error kinds the callable raises on purpose, with the text
    /// that proves it.
    #[serde(default)]
    pub error_conditions: BTreeSet<ErrorCondition>,
    #[serde(default)]
    pub relations: Vec<ParamRelation>,
    /// Cyclomatic complexity: 1 + branches + loop heads + extra boolean
    /// terms.
    pub complexity: u32,
    #[serde(default)]
    pub is_async: bool,
}

impl FunctionSignature {
    pub fn param(&self, name: &str) -> Option<&ParameterProfile> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn param_mut(&mut self, name: &str) -> Option<&mut ParameterProfile> {
        self.params.iter_mut().find(|p| p.name == name)
    }

    pub fn declares_error(&self, kind: &str) -> bool {
        self.error_conditions.iter().any(|c| c.kind == kind)
    }

    /// True when a guard compares `name` below another parameter or a
    /// collection length, i.e. an upper bound exists even though interval
    /// narrowing could not use it.
    pub fn has_relational_upper_bound(&self, name: &str) -> bool {
        self.relations.iter().any(|r| {
            r.lhs == name && matches!(r.op, CmpOp::Lt | CmpOp::Le)
        })
    }
}

/// The inferred model of a single parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterProfile {
    pub name: String,
    #[serde(default)]
    pub hint: Option<TypeHint>,
    pub domain: ValueDomain,
    /// Literal constants the parameter is compared against, plus its
    /// declared default. The domain never excludes these.
    #[serde(default)]
    pub observed: BTreeSet<Value>,
    /// Complementary sides of guards: inputs the callable turns away.
    #[serde(default)]
    pub rejected: Vec<Rejection>,
    #[serde(default)]
    pub roles: BTreeSet<UsageRole>,
}

impl ParameterProfile {
    pub fn unconstrained(name: &str) -> Self {
        Self {
            name: name.to_string(),
            hint: None,
            domain: ValueDomain::Unknown,
            observed: BTreeSet::new(),
            rejected: Vec::new(),
            roles: BTreeSet::new(),
        }
    }

    pub fn has_role(&self, role: UsageRole) -> bool {
        self.roles.contains(&role)
    }
}

/// How a parameter is used inside the body. Discovered syntactically by
/// the extractor; the failure-pattern matchers key off these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageRole {
    Divisor,
    IndexBound,
    LoopBound,
    AllocSize,
}

/// A named error kind raised somewhere in the body.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ErrorCondition {
    pub kind: String,
    pub evidence: String,
}

/// A rejected constraint: the input shape a guard turns away, and what
/// happens when it does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    /// Rendered constraint text, e.g. `b == 0`.
    pub constraint: String,
    pub action: RejectAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RejectAction {
    Raise { error: String },
    Return,
    FallThrough,
}

/// A guard comparing two parameters (or a parameter against another's
/// length). Interval narrowing cannot consume it; pattern matching can.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamRelation {
    pub lhs: String,
    pub op: CmpOp,
    pub rhs: RelationOperand,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelationOperand {
    Param { name: String },
    LenOf { name: String },
}

impl std::fmt::Display for ParamRelation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let op = match self.op {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        };
        match &self.rhs {
            RelationOperand::Param { name } => write!(f, "{} {op} {}", self.lhs, name),
            RelationOperand::LenOf { name } => write!(f, "{} {op} len({})", self.lhs, name),
        }
    }
}
