//! The per-callable pipeline and its parallel driver.
//!
//! One callable flows validate → extract → infer → catalog + patterns,
//! plus a property run when the sandbox knows the callable. Each analysis
//! owns its data until its report is collected, so the rayon phase shares
//! nothing mutable; the cache is read during the phase and extended after
//! it.

use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use gauntlet_ast::types::{CallableDecl, SourceUnit};
use gauntlet_engine::{run_property, PropertyConfig, PropertyReport};
use gauntlet_extract::{extract, flow_edges, validate_callable};
use gauntlet_infer::{infer, InferenceGap};
use gauntlet_profile::{ExpectedClass, FunctionSignature, TestCaseRecord};
use gauntlet_sandbox::{CallableRef, Sandbox};
use gauntlet_synth::{catalog, pattern_records};

use crate::cache::DomainCache;
use crate::limits::AnalysisLimits;

/// Which record kinds a run produces. Default: all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSources {
    pub boundary: bool,
    pub patterns: bool,
    pub property: bool,
}

impl Default for RecordSources {
    fn default() -> Self {
        Self {
            boundary: true,
            patterns: true,
            property: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub property: PropertyConfig,
    pub limits: AnalysisLimits,
    pub sources: RecordSources,
}

/// A callable the run could not analyze. Never fatal to siblings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedCallable {
    pub name: String,
    pub reason: String,
}

/// Everything learned about one callable.
#[derive(Debug, Clone)]
pub struct CallableReport {
    pub signature: FunctionSignature,
    pub records: Vec<TestCaseRecord>,
    pub gaps: Vec<InferenceGap>,
    pub property: Option<PropertyReport>,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub struct UnitReport {
    pub path: String,
    pub reports: Vec<CallableReport>,
    pub skipped: Vec<SkippedCallable>,
    pub cache_hits: usize,
}

/// Analyze every callable in the unit, in parallel, without a cache.
pub fn analyze_unit(
    unit: &SourceUnit,
    config: &AnalysisConfig,
    sandbox: &dyn Sandbox,
) -> UnitReport {
    let cache = DomainCache::new();
    run_unit(unit, config, sandbox, &cache).0
}

/// Like [`analyze_unit`], but consults `cache` before extract + infer and
/// stores fresh inferences back into it afterwards.
pub fn analyze_unit_cached(
    unit: &SourceUnit,
    config: &AnalysisConfig,
    sandbox: &dyn Sandbox,
    cache: &mut DomainCache,
) -> UnitReport {
    let (report, fresh) = run_unit(unit, config, sandbox, cache);
    for (key, signature) in fresh {
        cache.insert(key, signature);
    }
    report
}

struct AnalyzedCallable {
    report: CallableReport,
    fresh: Option<(String, FunctionSignature)>,
    cache_hit: bool,
}

fn run_unit(
    unit: &SourceUnit,
    config: &AnalysisConfig,
    sandbox: &dyn Sandbox,
    cache: &DomainCache,
) -> (UnitReport, Vec<(String, FunctionSignature)>) {
    let cutoff = config.limits.max_callables.min(unit.callables.len());
    let (eligible, overflow) = unit.callables.split_at(cutoff);
    if !overflow.is_empty() {
        log::warn!(
            "{}: analyzing {cutoff} of {} callables (limit)",
            unit.path,
            unit.callables.len()
        );
    }

    let results: Vec<Result<AnalyzedCallable, SkippedCallable>> = eligible
        .par_iter()
        .map(|decl| analyze_callable(decl, &unit.path, config, sandbox, cache))
        .collect();

    let mut reports = Vec::new();
    let mut skipped = Vec::new();
    let mut fresh = Vec::new();
    let mut cache_hits = 0;
    for result in results {
        match result {
            Ok(analyzed) => {
                if analyzed.cache_hit {
                    cache_hits += 1;
                }
                if let Some(entry) = analyzed.fresh {
                    fresh.push(entry);
                }
                reports.push(analyzed.report);
            }
            Err(skip) => {
                log::warn!("{}: skipping {}: {}", unit.path, skip.name, skip.reason);
                skipped.push(skip);
            }
        }
    }
    for decl in overflow {
        skipped.push(SkippedCallable {
            name: decl.name.clone(),
            reason: format!("unit callable limit ({}) reached", config.limits.max_callables),
        });
    }

    let report = UnitReport {
        path: unit.path.clone(),
        reports,
        skipped,
        cache_hits,
    };
    (report, fresh)
}

fn analyze_callable(
    decl: &CallableDecl,
    unit_path: &str,
    config: &AnalysisConfig,
    sandbox: &dyn Sandbox,
    cache: &DomainCache,
) -> Result<AnalyzedCallable, SkippedCallable> {
    let started = Instant::now();

    if let Err(problems) = validate_callable(decl) {
        let reason = problems
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(SkippedCallable {
            name: decl.name.clone(),
            reason,
        });
    }

    let key = decl.source_text.as_deref().map(DomainCache::key);
    let cached = key.as_deref().and_then(|k| cache.get(k));
    let (signature, gaps, cache_hit, fresh) = match cached {
        Some(signature) => {
            log::debug!("{}: domain cache hit", signature.qualified_name);
            (signature.clone(), Vec::new(), true, None)
        }
        None => {
            let seeded = extract(decl, unit_path);
            let edges = flow_edges(decl);
            let inferred = infer(seeded, &edges);
            let fresh = key.map(|k| (k, inferred.signature.clone()));
            (inferred.signature, inferred.gaps, false, fresh)
        }
    };

    let mut records = Vec::new();
    if config.sources.boundary {
        for case in catalog(&signature) {
            records.push(TestCaseRecord::from_edge_case(&case, ExpectedClass::Nominal));
        }
    }
    if config.sources.patterns {
        records.extend(pattern_records(&signature));
    }
    if records.len() > config.limits.max_cases_per_callable {
        log::warn!(
            "{}: keeping {} of {} cases (limit)",
            signature.qualified_name,
            config.limits.max_cases_per_callable,
            records.len()
        );
        records.truncate(config.limits.max_cases_per_callable);
    }

    let callable = CallableRef::new(&signature.qualified_name);
    let property = (config.sources.property && sandbox.knows(&callable)).then(|| {
        let property_config = PropertyConfig {
            max_trials: config.limits.trial_budget(signature.complexity),
            ..config.property.clone()
        };
        run_property(sandbox, &callable, &signature, &property_config)
    });
    if let Some(report) = &property {
        if let Some(cx) = &report.counterexample {
            records.push(TestCaseRecord::from_counterexample(cx));
        }
    }

    Ok(AnalyzedCallable {
        report: CallableReport {
            signature,
            records,
            gaps,
            property,
            elapsed: started.elapsed(),
        },
        fresh,
        cache_hit,
    })
}
