//! Orchestration of the lab report pipeline.

pub mod pipeline;
pub mod steps;

pub use pipeline::{LabPipeline, LabPipelineBuilder, PipelineResult};
pub use steps::{PipelineStep, StageFailure, StepRecord, StepStatus};
