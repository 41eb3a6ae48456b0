//! Predict Gate - Resilient prediction ingestion service for VitalTrack
//!
//! This library implements the prediction ingestion pipeline: input
//! normalization, resilient invocation of the external scoring service,
//! deterministic aggregation of model outcomes, risk-tier classification,
//! and the atomic persistence write with best-effort notification dispatch.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{aggregate, classify, normalize, Pipeline, PipelineError};
pub use crate::models::{
    AggregatedDecision, DecisionRecord, DispatchOutcome, MeasurementSet, ModelOutcome,
    PredictRequest, PredictionResponse, RiskAssessment, RiskTier,
};
