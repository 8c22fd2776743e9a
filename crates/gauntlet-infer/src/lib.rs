pub mod engine;
pub mod narrow;

pub use engine::{infer, InferenceGap, InferenceReport};
