pub mod config;
pub mod errors;
pub mod judge;
pub mod model;
pub mod pipeline;
pub mod providers;
pub mod report;
pub mod sample;
pub mod summary;

pub use errors::{ConfigError, GuardReason, PipelineError};
pub use judge::Judge;
pub use model::{EvaluationResult, Metric, MetricName};
pub use pipeline::{EditSession, Phase, PipelineController};
pub use summary::SummaryGenerator;
