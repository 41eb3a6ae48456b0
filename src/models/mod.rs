// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AggregatedDecision, DecisionRecord, DispatchOutcome, MeasurementSet, ModelOutcome,
    NotificationRecord, RiskAssessment, RiskTier,
};
pub use requests::{OwnerQuery, PredictRequest};
pub use responses::{
    DecisionListResponse, ErrorResponse, HealthResponse, NotificationListResponse,
    PredictionResponse,
};
