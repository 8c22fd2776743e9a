pub mod config;
pub mod generate;
pub mod pool;
pub mod rng;
pub mod shrink;
pub mod trial;

pub use config::PropertyConfig;
pub use pool::{run_property, PropertyReport};
pub use rng::trial_rng;
pub use shrink::{shrink, ShrinkOutcome};
