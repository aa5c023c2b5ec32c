pub mod orchestrator;
pub mod report;

pub use orchestrator::{repair_project, RepairError, RepairPipeline};
pub use report::{AppliedFix, PipelineResult, Readiness};
