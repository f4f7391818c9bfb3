//! Race Analysis Use Case
//!
//! ## Pipeline
//! 1. Build the program trace from the configured entry
//! 2. Index accesses per abstract object, keep shared objects
//! 3. Build the happens-before graph and lock sets
//! 4. Report conflicting, unordered, unprotected access pairs
//!
//! ## Example
//! ```
//! use racegraph_ir::config::AnalysisConfig;
//! use racegraph_ir::features::points_to::StaticPointsTo;
//! use racegraph_ir::features::race_detection::RaceAnalysis;
//! use racegraph_ir::shared::models::{ModuleBuilder, Operand};
//!
//! let mut mb = ModuleBuilder::new("counter.c");
//! let (t1, t2, counter) = (mb.value(), mb.value(), mb.value());
//! mb.function("worker", |f| {
//!     f.load(counter);
//!     f.store(counter);
//! });
//! mb.function("main", |f| {
//!     for handle in [t1, t2] {
//!         f.call("pthread_create", vec![handle.into(), Operand::Null, Operand::function("worker"), Operand::Null]);
//!     }
//!     for handle in [t1, t2] {
//!         f.call("pthread_join", vec![handle.into(), Operand::Null]);
//!     }
//! });
//! let module = mb.build();
//! let mut pts = StaticPointsTo::new();
//! let obj = pts.object("counter");
//! pts.bind(counter, [obj]);
//!
//! let config = AnalysisConfig::default();
//! let races = RaceAnalysis::new(&module, &pts, &config).run().unwrap();
//! assert!(!races.is_empty());
//! ```

use crate::config::AnalysisConfig;
use crate::errors::Result;
use crate::features::points_to::PointsToProvider;
use crate::features::race_detection::domain::{Race, RaceSeverity};
use crate::features::race_detection::infrastructure::{HappensBeforeGraph, LockSet, RaceDetector};
use crate::features::shared_memory::SharedMemory;
use crate::features::trace::domain::ProgramTrace;
use crate::features::trace::TraceBuilder;
use crate::shared::models::Module;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;

pub struct RaceAnalysis<'a> {
    module: &'a Module,
    points_to: &'a dyn PointsToProvider,
    config: &'a AnalysisConfig,
}

impl<'a> RaceAnalysis<'a> {
    pub fn new(module: &'a Module, points_to: &'a dyn PointsToProvider, config: &'a AnalysisConfig) -> Self {
        Self {
            module,
            points_to,
            config,
        }
    }

    /// Validate the configuration, trace the program and detect races
    pub fn run(&self) -> Result<Vec<Race>> {
        self.config.validate()?;
        let trace = TraceBuilder::new(self.module, self.points_to, self.config).build()?;
        Ok(Self::run_on_trace(&trace, self.config))
    }

    /// Detect races on an already built trace
    pub fn run_on_trace(trace: &ProgramTrace<'_>, config: &AnalysisConfig) -> Vec<Race> {
        let shared = SharedMemory::new(trace);
        if shared.shared_objects().is_empty() {
            info!(module = trace.module().name(), "no shared objects, nothing to check");
            return Vec::new();
        }
        let hb = HappensBeforeGraph::new(trace);
        let locks = LockSet::new(trace);
        RaceDetector::new(trace, &shared, &hb, &locks)
            .with_parallel(config.parallel)
            .detect()
    }

    /// Race counts by severity
    pub fn summarize(races: &[Race]) -> RaceSummary {
        let mut summary = RaceSummary {
            total_races: races.len(),
            ..RaceSummary::default()
        };
        for race in races {
            match race.severity {
                RaceSeverity::Critical => summary.critical += 1,
                RaceSeverity::High => summary.high += 1,
                RaceSeverity::Medium => summary.medium += 1,
            }
        }
        summary.objects = races
            .iter()
            .map(|race| race.object)
            .collect::<BTreeSet<_>>()
            .len();
        summary
    }
}

/// Race analysis summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceSummary {
    pub total_races: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    /// Distinct objects with at least one race
    pub objects: usize,
}
