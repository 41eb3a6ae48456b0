use serde::{Deserialize, Serialize};
use crate::models::domain::{DecisionRecord, NotificationRecord, RiskTier};

/// Caller-facing result of a successful prediction request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub id: uuid::Uuid,
    pub decision: bool,
    pub confidence: f64,
    pub tier: RiskTier,
    pub recommendation: String,
    #[serde(rename = "modelUsed")]
    pub model_used: String,
}

impl From<&DecisionRecord> for PredictionResponse {
    fn from(record: &DecisionRecord) -> Self {
        Self {
            id: record.id,
            decision: record.decision,
            confidence: record.confidence,
            tier: record.tier,
            recommendation: record.recommendation.clone(),
            model_used: record.source_model.clone(),
        }
    }
}

/// Response for the decision listing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionListResponse {
    pub decisions: Vec<DecisionRecord>,
    pub total: usize,
}

/// Response for the notification listing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationListResponse {
    pub notifications: Vec<NotificationRecord>,
    pub unread: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
