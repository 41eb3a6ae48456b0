use crate::core::aggregate::{aggregate, AggregationError};
use crate::core::normalizer::{normalize, ValidationError};
use crate::core::risk::classify;
use crate::models::{DecisionRecord, DispatchOutcome, MeasurementSet, ModelOutcome};
use crate::services::notifier::DispatchError;
use crate::services::scoring::ScoringError;
use crate::services::store::{NewDecision, PersistenceError};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

/// External scoring collaborator seam
#[async_trait]
pub trait ScoreService: Send + Sync {
    async fn score(&self, measurements: &MeasurementSet) -> Result<Vec<ModelOutcome>, ScoringError>;
}

/// Durable record store seam
#[async_trait]
pub trait DecisionStore: Send + Sync {
    /// Write the decision and its notification atomically; both rows become
    /// visible together or not at all.
    async fn create_decision_with_notification(
        &self,
        decision: NewDecision,
        summary: &str,
    ) -> Result<DecisionRecord, PersistenceError>;
}

/// Outbound message transport seam
#[async_trait]
pub trait NotifyTransport: Send + Sync {
    async fn send(&self, address: &str, subject: &str, body: &str) -> Result<(), DispatchError>;
}

/// Any fatal error of one pipeline run
///
/// Dispatch failures are absent on purpose: notification delivery is not part
/// of the request's success criterion.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error(transparent)]
    Aggregation(#[from] AggregationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl PipelineError {
    /// Stable error kind exposed in the caller-facing error object.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Validation(_) => "validation_error",
            PipelineError::Scoring(ScoringError::InvalidResponse(_)) => "scoring_invalid_response",
            PipelineError::Scoring(_) => "scoring_unavailable",
            PipelineError::Aggregation(_) => "malformed_model_output",
            PipelineError::Persistence(PersistenceError::Conflict(_)) => "conflict",
            PipelineError::Persistence(PersistenceError::InvalidReference(_)) => "invalid_reference",
            PipelineError::Persistence(PersistenceError::StoreUnavailable(_)) => "store_unavailable",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            PipelineError::Validation(_) => 400,
            PipelineError::Scoring(ScoringError::InvalidResponse(_)) => 502,
            PipelineError::Scoring(_) => 503,
            PipelineError::Aggregation(_) => 502,
            PipelineError::Persistence(PersistenceError::Conflict(_)) => 409,
            PipelineError::Persistence(_) => 500,
        }
    }
}

/// Prediction pipeline orchestrator
///
/// Drives one request through normalize, score, aggregate, classify and the
/// atomic persistence write, then hands the notification to a detached task.
/// Collaborators are injected so tests can substitute fakes; each run is
/// fully request-scoped with no state retained across requests.
pub struct Pipeline<S, R, N> {
    scoring: Arc<S>,
    store: Arc<R>,
    notifier: Arc<N>,
}

impl<S, R, N> Pipeline<S, R, N>
where
    S: ScoreService + 'static,
    R: DecisionStore + 'static,
    N: NotifyTransport + 'static,
{
    pub fn new(scoring: Arc<S>, store: Arc<R>, notifier: Arc<N>) -> Self {
        Self {
            scoring,
            store,
            notifier,
        }
    }

    /// Run the full pipeline for one request.
    ///
    /// Everything before the persistence write is pure or retryable
    /// computation; the write is the transaction boundary. When `contact` is
    /// present the notification is dispatched from a detached task after the
    /// write succeeds, so its outcome can neither delay nor fail the
    /// response.
    pub async fn run(
        &self,
        owner_id: &str,
        contact: Option<&str>,
        raw: &Map<String, Value>,
    ) -> Result<DecisionRecord, PipelineError> {
        let measurements = normalize(raw)?;

        let outcomes = self.scoring.score(&measurements).await?;
        let decision = aggregate(&outcomes)?;
        let assessment = classify(decision.confidence);

        tracing::info!(
            "Aggregated decision for owner {}: {} at {:.1}% ({}, tier {})",
            owner_id,
            decision.decision,
            decision.confidence,
            decision.source_model,
            assessment.tier.as_str()
        );

        let summary = format!(
            "Prediction for {}: {} risk ({:.1}% confidence). {}",
            measurements.subject_name,
            assessment.tier.as_str(),
            decision.confidence,
            assessment.recommendation
        );

        let record = self
            .store
            .create_decision_with_notification(
                NewDecision {
                    owner_id: owner_id.to_string(),
                    measurements,
                    decision: decision.decision,
                    confidence: decision.confidence,
                    source_model: decision.source_model,
                    tier: assessment.tier,
                    recommendation: assessment.recommendation,
                },
                &summary,
            )
            .await?;

        if let Some(address) = contact {
            self.dispatch_detached(&record, address.to_string());
        }

        Ok(record)
    }

    /// Send the outcome message, converting every transport failure into a
    /// logged `DispatchOutcome` instead of an error.
    pub async fn dispatch(&self, record: &DecisionRecord, address: &str) -> DispatchOutcome {
        dispatch_with(self.notifier.as_ref(), record, address).await
    }

    fn dispatch_detached(&self, record: &DecisionRecord, address: String) {
        let notifier = Arc::clone(&self.notifier);
        let record = record.clone();

        tokio::spawn(async move {
            dispatch_with(notifier.as_ref(), &record, &address).await;
        });
    }
}

async fn dispatch_with<N: NotifyTransport + ?Sized>(
    notifier: &N,
    record: &DecisionRecord,
    address: &str,
) -> DispatchOutcome {
    let subject = format!(
        "Health prediction result for {}",
        record.measurements.subject_name
    );
    let body = format!(
        "Risk tier: {}\nConfidence: {:.1}%\nRecommendation: {}",
        record.tier.as_str(),
        record.confidence,
        record.recommendation
    );

    match notifier.send(address, &subject, &body).await {
        Ok(()) => {
            tracing::debug!("Notification for decision {} dispatched", record.id);
            DispatchOutcome::sent()
        }
        Err(e) => {
            tracing::warn!(
                "Notification dispatch failed for decision {} to {}: {}",
                record.id,
                address,
                e
            );
            DispatchOutcome::failed(e.to_string())
        }
    }
}
