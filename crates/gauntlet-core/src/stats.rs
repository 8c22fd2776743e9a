use serde::{Deserialize, Serialize};

use gauntlet_profile::Provenance;

use crate::pipeline::UnitReport;

/// Aggregate counters for a run. Built per unit after the parallel phase,
/// then merged across units; `elapsed_seconds` sums per-callable analysis
/// time, not wall clock.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub analyzed: usize,
    pub skipped: usize,
    pub cache_hits: usize,
    pub boundary_records: usize,
    pub pattern_records: usize,
    pub property_records: usize,
    pub counterexamples: usize,
    pub inference_gaps: usize,
    pub elapsed_seconds: f64,
}

impl AnalysisStats {
    pub fn from_unit(report: &UnitReport) -> Self {
        let mut stats = Self {
            skipped: report.skipped.len(),
            cache_hits: report.cache_hits,
            ..Self::default()
        };
        for callable in &report.reports {
            stats.analyzed += 1;
            stats.inference_gaps += callable.gaps.len();
            stats.elapsed_seconds += callable.elapsed.as_secs_f64();
            if let Some(property) = &callable.property {
                if property.counterexample.is_some() {
                    stats.counterexamples += 1;
                }
            }
            for record in &callable.records {
                match record.provenance {
                    Provenance::Boundary { .. } => stats.boundary_records += 1,
                    Provenance::Pattern { .. } => stats.pattern_records += 1,
                    Provenance::Property { .. } => stats.property_records += 1,
                }
            }
        }
        stats
    }

    pub fn merge(&mut self, other: &AnalysisStats) {
        self.analyzed += other.analyzed;
        self.skipped += other.skipped;
        self.cache_hits += other.cache_hits;
        self.boundary_records += other.boundary_records;
        self.pattern_records += other.pattern_records;
        self.property_records += other.property_records;
        self.counterexamples += other.counterexamples;
        self.inference_gaps += other.inference_gaps;
        self.elapsed_seconds += other.elapsed_seconds;
    }

    pub fn total_records(&self) -> usize {
        self.boundary_records + self.pattern_records + self.property_records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_sums_every_counter() {
        let mut a = AnalysisStats {
            analyzed: 2,
            skipped: 1,
            cache_hits: 1,
            boundary_records: 10,
            pattern_records: 3,
            property_records: 1,
            counterexamples: 1,
            inference_gaps: 2,
            elapsed_seconds: 0.5,
        };
        let b = AnalysisStats {
            analyzed: 1,
            boundary_records: 4,
            elapsed_seconds: 0.25,
            ..AnalysisStats::default()
        };
        a.merge(&b);
        assert_eq!(a.analyzed, 3);
        assert_eq!(a.boundary_records, 14);
        assert_eq!(a.total_records(), 18);
        assert!((a.elapsed_seconds - 0.75).abs() < 1e-9);
    }
}
