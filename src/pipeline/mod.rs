pub mod batch;
pub mod run;
pub mod sensitivity;

pub use batch::{partition_by_driver, run_pipeline, PipelineOutput, PreparedBatch};
pub use sensitivity::{compare_runs, sensitivity_sweep, RunComparison, SensitivityResult};
