//! Orchestration: runs the analysis pipeline over whole source units.

pub mod cache;
pub mod limits;
pub mod pipeline;
pub mod stats;

pub use cache::DomainCache;
pub use limits::AnalysisLimits;
pub use pipeline::{
    analyze_unit, analyze_unit_cached, AnalysisConfig, CallableReport, RecordSources,
    SkippedCallable, UnitReport,
};
pub use stats::AnalysisStats;
