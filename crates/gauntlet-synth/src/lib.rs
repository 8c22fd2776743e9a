pub mod catalog;
pub mod pairwise;
pub mod patterns;

pub use catalog::{catalog, edge_values};
pub use patterns::{load_patterns, match_patterns, pattern_records, FailurePattern, MatchEvidence};
