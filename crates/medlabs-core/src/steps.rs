//! Per-stage execution records.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStep {
    Ingest,
    Extract,
    Normalize,
    Map,
    Validate,
}

impl PipelineStep {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ingest => "ingest",
            Self::Extract => "extract",
            Self::Normalize => "normalize",
            Self::Map => "map",
            Self::Validate => "validate",
        }
    }
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Ok,
    Error,
}

impl StepStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome and timing of one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: PipelineStep,
    pub duration_ms: u64,
    pub status: StepStatus,
    pub warning_count: usize,
    pub error_count: usize,
}

impl StepRecord {
    /// Builds a record timed from `start` and emits the `pipeline.step` event.
    pub(crate) fn finish(
        step: PipelineStep,
        start: Instant,
        status: StepStatus,
        warning_count: usize,
        error_count: usize,
    ) -> Self {
        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            pipeline_step = %step,
            duration_ms,
            status = %status,
            warning_count,
            error_count,
            "pipeline.step"
        );
        Self {
            step,
            duration_ms,
            status,
            warning_count,
            error_count,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == StepStatus::Ok
    }
}

/// Error context of a run that stopped early.
///
/// Holds the records of every stage that ran, ending with the failed one.
/// Recover it with `error.downcast_ref::<StageFailure>()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFailure {
    message: String,
    pub steps: Vec<StepRecord>,
}

impl StageFailure {
    pub(crate) fn new(message: impl Into<String>, steps: Vec<StepRecord>) -> Self {
        Self {
            message: message.into(),
            steps,
        }
    }

    pub fn failed_step(&self) -> Option<PipelineStep> {
        self.steps.last().map(|record| record.step)
    }
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
