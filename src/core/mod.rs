// Core pipeline stage exports
pub mod aggregate;
pub mod normalizer;
pub mod pipeline;
pub mod risk;

pub use aggregate::{aggregate, AggregationError};
pub use normalizer::{normalize, FieldError, FieldReason, ValidationError};
pub use pipeline::{DecisionStore, NotifyTransport, Pipeline, PipelineError, ScoreService};
pub use risk::classify;
