use serde::{Deserialize, Serialize};

use crate::node::{LiteralNode, Node};

/// A parsed source file, reduced to the callables worth analyzing.
///
/// Produced by a language-specific front end; everything downstream of this
/// crate is language-agnostic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceUnit {
    pub path: String,
    pub callables: Vec<CallableDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallableDecl {
    pub name: String,
    pub params: Vec<ParamDecl>,
    #[serde(default)]
    pub return_hint: Option<TypeHint>,
    #[serde(default)]
    pub body: Vec<Node>,
    #[serde(default)]
    pub is_async: bool,
    /// Verbatim text of the callable when the front end kept it. Keys the
    /// content-hash cache; analysis never reads it.
    #[serde(default)]
    pub source_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDecl {
    pub name: String,
    #[serde(default)]
    pub hint: Option<TypeHint>,
    #[serde(default)]
    pub default: Option<LiteralNode>,
}

/// Declared type hints. Front ends map their own annotation syntax onto
/// these; anything that does not fit arrives as `Named` and is treated as
/// unconstrained downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TypeHint {
    Int,
    Float,
    Str,
    Bool,
    List,
    Map,
    Optional { inner: Box<TypeHint> },
    Named { name: String },
}

impl SourceUnit {
    pub fn find_callable(&self, name: &str) -> Option<&CallableDecl> {
        self.callables.iter().find(|c| c.name == name)
    }
}

impl CallableDecl {
    /// Qualified name used everywhere downstream: `path::name`.
    pub fn qualified_name(&self, unit_path: &str) -> String {
        if unit_path.is_empty() {
            self.name.clone()
        } else {
            format!("{unit_path}::{}", self.name)
        }
    }
}
