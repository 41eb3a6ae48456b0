use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validated input features for one scoring request.
///
/// Built once by the normalizer from raw request input and never mutated
/// afterwards. All clinical measurements are required and non-negative.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeasurementSet {
    /// Subject-identifying name; "Unknown" when the caller omitted it.
    pub subject_name: String,
    pub pregnancies: u32,
    pub glucose: f64,
    pub blood_pressure: f64,
    pub skin_thickness: f64,
    pub insulin: f64,
    pub bmi: f64,
    pub diabetes_pedigree: f64,
    pub age: u32,
}

/// One named model's raw output as parsed from the scoring response.
///
/// `prediction` and `confidence` stay optional here: the scoring client
/// parses leniently and the aggregator decides whether a missing field is
/// fatal. They are never defaulted to false/zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOutcome {
    pub model: String,
    pub prediction: Option<bool>,
    pub confidence: Option<f64>,
}

/// The single winning outcome after reconciling all model outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedDecision {
    pub decision: bool,
    pub confidence: f64,
    pub source_model: String,
}

/// Risk tier derived from the aggregated confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Moderate => "moderate",
            RiskTier::High => "high",
            RiskTier::Critical => "critical",
        }
    }

    /// Parse a stored tier string; anything unrecognized maps to Low.
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "critical" => RiskTier::Critical,
            "high" => RiskTier::High,
            "moderate" => RiskTier::Moderate,
            _ => RiskTier::Low,
        }
    }
}

/// Tier plus the recommendation text shown to the subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub tier: RiskTier,
    pub recommendation: String,
}

/// Durable record of one completed prediction request.
///
/// Owned by the record store; identity and creation timestamp are assigned
/// on insert and the row is immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub id: Uuid,
    #[serde(rename = "ownerId")]
    pub owner_id: String,
    pub measurements: MeasurementSet,
    pub decision: bool,
    pub confidence: f64,
    #[serde(rename = "sourceModel")]
    pub source_model: String,
    pub tier: RiskTier,
    pub recommendation: String,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Durable notification row, written in the same transaction as its decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: Uuid,
    #[serde(rename = "decisionId")]
    pub decision_id: Uuid,
    #[serde(rename = "ownerId")]
    pub owner_id: String,
    pub summary: String,
    pub unread: bool,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// In-memory result of a best-effort dispatch attempt. Never persisted and
/// never part of the caller-facing response.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    pub ok: bool,
    pub reason: Option<String>,
}

impl DispatchOutcome {
    pub fn sent() -> Self {
        Self { ok: true, reason: None }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self { ok: false, reason: Some(reason.into()) }
    }
}
