//! Test data builders
//!
//! Helpers that emit the call shapes of each threading API, plus a
//! `Fixture` bundling a module with its points-to table.

use racegraph_ir::config::AnalysisConfig;
use racegraph_ir::features::points_to::{AbstractObject, StaticPointsTo};
use racegraph_ir::features::race_detection::{Race, RaceAnalysis};
use racegraph_ir::features::trace::ProgramTrace;
use racegraph_ir::shared::models::{FunctionBuilder, InstId, Module, Operand, ValueId};

pub fn spawn(f: &mut FunctionBuilder<'_>, handle: ValueId, entry: &str) -> InstId {
    f.call(
        "pthread_create",
        vec![handle.into(), Operand::Null, Operand::function(entry), Operand::Null],
    )
}

pub fn join(f: &mut FunctionBuilder<'_>, handle: ValueId) -> InstId {
    f.call("pthread_join", vec![handle.into(), Operand::Null])
}

pub fn lock(f: &mut FunctionBuilder<'_>, mutex: ValueId) -> InstId {
    f.call("pthread_mutex_lock", vec![mutex.into()])
}

pub fn unlock(f: &mut FunctionBuilder<'_>, mutex: ValueId) -> InstId {
    f.call("pthread_mutex_unlock", vec![mutex.into()])
}

/// `#pragma omp parallel` calling `outlined`
pub fn omp_parallel(f: &mut FunctionBuilder<'_>, outlined: &str) -> InstId {
    f.call(
        "__kmpc_fork_call",
        vec![Operand::Null, Operand::Const(0), Operand::function(outlined)],
    )
}

/// `#pragma omp task` running `entry`: task allocation then task spawn
pub fn omp_task(f: &mut FunctionBuilder<'_>, entry: &str) -> InstId {
    let alloc = f.call(
        "__kmpc_omp_task_alloc",
        vec![
            Operand::Null,
            Operand::Const(0),
            Operand::Const(1),
            Operand::Const(64),
            Operand::Const(0),
            Operand::function(entry),
        ],
    );
    f.call(
        "__kmpc_omp_task",
        vec![Operand::Null, Operand::Const(0), Operand::Result(alloc)],
    )
}

pub fn omp_call(f: &mut FunctionBuilder<'_>, runtime_fn: &str) -> InstId {
    f.call(runtime_fn, vec![Operand::Null, Operand::Const(0)])
}

pub fn cuda_launch(f: &mut FunctionBuilder<'_>, kernel: &str) -> InstId {
    f.call("cudaLaunch", vec![Operand::function(kernel)])
}

/// A module together with the points-to facts it is analyzed under
pub struct Fixture {
    pub module: Module,
    pub pts: StaticPointsTo,
}

impl Fixture {
    /// Each value points to its own object
    pub fn distinct(module: Module, values: &[ValueId]) -> Self {
        let mut pts = StaticPointsTo::new();
        for &value in values {
            let object = pts.object(format!("v{}", value.0));
            pts.bind(value, [object]);
        }
        Self { module, pts }
    }

    /// All values point to one object
    pub fn aliased(module: Module, values: &[ValueId]) -> (Self, AbstractObject) {
        let mut pts = StaticPointsTo::new();
        let object = pts.object("shared");
        for &value in values {
            pts.bind(value, [object]);
        }
        (Self { module, pts }, object)
    }

    pub fn trace(&self, config: &AnalysisConfig) -> ProgramTrace<'_> {
        ProgramTrace::build(&self.module, &self.pts, config).expect("trace should build")
    }

    pub fn races(&self) -> Vec<Race> {
        self.races_with(&AnalysisConfig::default())
    }

    pub fn races_with(&self, config: &AnalysisConfig) -> Vec<Race> {
        RaceAnalysis::new(&self.module, &self.pts, config)
            .run()
            .expect("analysis should succeed")
    }
}
