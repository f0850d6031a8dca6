// file: src/pipeline/mod.rs
// description: pipeline module exports and public api
// reference: pipeline orchestration

mod orchestrator;
mod progress;

pub use orchestrator::{AnswerAttempt, ProspectusPipeline, SummaryAttempt, SummaryOutcome};
pub use progress::{PipelineCounters, PipelineStage, PipelineStats, ProgressTracker};
