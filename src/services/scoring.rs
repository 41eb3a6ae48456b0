use crate::core::pipeline::ScoreService;
use crate::models::{MeasurementSet, ModelOutcome};
use crate::services::retry::RetryPolicy;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors from the external scoring collaborator
///
/// `Unavailable` carries attempt count and elapsed time for diagnosis but no
/// payload contents.
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("scoring service unavailable after {attempts} attempts in {elapsed:?}: {last_error}")]
    Unavailable {
        attempts: u32,
        elapsed: Duration,
        last_error: String,
    },

    #[error("scoring service rejected the request: HTTP {status}")]
    Rejected { status: u16 },

    #[error("invalid scoring response: {0}")]
    InvalidResponse(String),
}

/// Outcome of a single scoring attempt, before the retry loop decides
/// whether to try again.
enum AttemptError {
    Retryable(String),
    Fatal(ScoringError),
}

/// HTTP client for the external scoring service
///
/// Issues one POST per prediction request under a bounded per-attempt
/// timeout. Transport failures, request-timeouts (408) and 5xx responses are
/// retried sequentially with exponential backoff under one shared
/// `RetryPolicy`; other 4xx responses fail immediately without consuming the
/// retry budget. The scoring call is the single suspension point of the
/// pipeline's pure upstream stages.
pub struct ScoringClient {
    endpoint: String,
    client: Client,
    policy: RetryPolicy,
    request_timeout: Duration,
}

impl ScoringClient {
    pub fn new(endpoint: String, request_timeout: Duration, policy: RetryPolicy) -> Self {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            endpoint,
            client,
            policy,
            request_timeout,
        }
    }

    /// Serialize the measurement set to the collaborator's exact shape.
    /// Explicit field-by-field mapping; unexpected input fields never pass
    /// through.
    fn payload(measurements: &MeasurementSet) -> Value {
        serde_json::json!({
            "Pregnancies": measurements.pregnancies,
            "Glucose": measurements.glucose,
            "BloodPressure": measurements.blood_pressure,
            "SkinThickness": measurements.skin_thickness,
            "Insulin": measurements.insulin,
            "BMI": measurements.bmi,
            "DiabetesPedigreeFunction": measurements.diabetes_pedigree,
            "Age": measurements.age,
        })
    }

    async fn attempt(&self, payload: &Value) -> Result<Value, AttemptError> {
        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.request_timeout)
            .json(payload)
            .send()
            .await
            .map_err(|e| AttemptError::Retryable(transport_reason(&e)))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<Value>()
                .await
                .map_err(|e| {
                    AttemptError::Fatal(ScoringError::InvalidResponse(format!(
                        "body is not JSON: {}",
                        e
                    )))
                });
        }

        if status.is_server_error() || status == StatusCode::REQUEST_TIMEOUT {
            return Err(AttemptError::Retryable(format!("HTTP {}", status.as_u16())));
        }

        Err(AttemptError::Fatal(ScoringError::Rejected {
            status: status.as_u16(),
        }))
    }

    async fn score_with_retries(
        &self,
        measurements: &MeasurementSet,
    ) -> Result<Vec<ModelOutcome>, ScoringError> {
        let payload = Self::payload(measurements);
        let started = Instant::now();
        let mut attempt = 0u32;

        loop {
            match self.attempt(&payload).await {
                Ok(body) => return parse_outcomes(&body),
                Err(AttemptError::Fatal(e)) => return Err(e),
                Err(AttemptError::Retryable(reason)) => {
                    if !self.policy.should_retry(attempt) {
                        return Err(ScoringError::Unavailable {
                            attempts: attempt + 1,
                            elapsed: started.elapsed(),
                            last_error: reason,
                        });
                    }

                    let delay = self.policy.delay_for(attempt);
                    tracing::warn!(
                        "Scoring attempt {} failed ({}), retrying in {:?}",
                        attempt + 1,
                        reason,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[async_trait]
impl ScoreService for ScoringClient {
    async fn score(&self, measurements: &MeasurementSet) -> Result<Vec<ModelOutcome>, ScoringError> {
        self.score_with_retries(measurements).await
    }
}

fn transport_reason(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        format!("connect error: {}", e)
    } else {
        format!("transport error: {}", e)
    }
}

/// Parse the scoring response `{ <model>: {prediction, confidence, ...} }`
/// into named outcomes, preserving the response's entry order.
///
/// An empty or non-object body, or a non-object model entry, is an
/// `InvalidResponse`. Missing prediction/confidence fields inside an entry
/// are left as `None` for the aggregator to reject, never defaulted.
fn parse_outcomes(body: &Value) -> Result<Vec<ModelOutcome>, ScoringError> {
    let entries = body
        .as_object()
        .ok_or_else(|| ScoringError::InvalidResponse("body is not a JSON object".to_string()))?;

    if entries.is_empty() {
        return Err(ScoringError::InvalidResponse(
            "body contains no model entries".to_string(),
        ));
    }

    let mut outcomes = Vec::with_capacity(entries.len());
    for (model, entry) in entries {
        let fields = entry.as_object().ok_or_else(|| {
            ScoringError::InvalidResponse(format!("entry for model '{}' is not an object", model))
        })?;

        outcomes.push(ModelOutcome {
            model: model.clone(),
            prediction: fields.get("prediction").and_then(as_prediction),
            confidence: confidence_field(fields),
        });
    }

    Ok(outcomes)
}

/// Accept boolean predictions plus the collaborator's 0/1 integer encoding.
fn as_prediction(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        _ => None,
    }
}

/// Confidence key normalization: `confidence` first, then the collaborator's
/// legacy misspelling `confidnce`. Precedence is fixed here rather than
/// chained at call sites.
fn confidence_field(fields: &serde_json::Map<String, Value>) -> Option<f64> {
    fields
        .get("confidence")
        .or_else(|| fields.get("confidnce"))
        .and_then(Value::as_f64)
}
