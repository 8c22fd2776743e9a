pub mod flow;
pub mod signature;
pub mod validate;

pub use flow::{flow_edges, FlowEdge, Operand};
pub use signature::extract;
pub use validate::{validate_callable, ValidateError};
