pub mod node;
pub mod parse;
pub mod types;

pub use parse::{parse_unit, ParseError};
