// End-to-end pipeline tests with fake collaborators

use async_trait::async_trait;
use predict_gate::core::{DecisionStore, NotifyTransport, Pipeline, ScoreService};
use predict_gate::models::{DecisionRecord, MeasurementSet, ModelOutcome, RiskTier};
use predict_gate::services::notifier::DispatchError;
use predict_gate::services::scoring::ScoringError;
use predict_gate::services::store::{NewDecision, PersistenceError};
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct ScriptedScore {
    outcomes: Result<Vec<ModelOutcome>, String>,
    calls: AtomicUsize,
}

impl ScriptedScore {
    fn ok(outcomes: Vec<ModelOutcome>) -> Self {
        Self {
            outcomes: Ok(outcomes),
            calls: AtomicUsize::new(0),
        }
    }

    fn unavailable() -> Self {
        Self {
            outcomes: Err("HTTP 503".to_string()),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ScoreService for ScriptedScore {
    async fn score(&self, _m: &MeasurementSet) -> Result<Vec<ModelOutcome>, ScoringError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcomes {
            Ok(v) => Ok(v.clone()),
            Err(reason) => Err(ScoringError::Unavailable {
                attempts: 3,
                elapsed: Duration::from_millis(750),
                last_error: reason.clone(),
            }),
        }
    }
}

/// In-memory record store mirroring the atomic decision+notification write:
/// on failure neither list gains an entry.
#[derive(Default)]
struct MemoryStore {
    decisions: Mutex<Vec<DecisionRecord>>,
    notifications: Mutex<Vec<String>>,
    fail: bool,
}

#[async_trait]
impl DecisionStore for MemoryStore {
    async fn create_decision_with_notification(
        &self,
        decision: NewDecision,
        summary: &str,
    ) -> Result<DecisionRecord, PersistenceError> {
        if self.fail {
            return Err(PersistenceError::StoreUnavailable("connection refused".to_string()));
        }

        let record = DecisionRecord {
            id: uuid::Uuid::new_v4(),
            owner_id: decision.owner_id,
            measurements: decision.measurements,
            decision: decision.decision,
            confidence: decision.confidence,
            source_model: decision.source_model,
            tier: decision.tier,
            recommendation: decision.recommendation,
            created_at: chrono::Utc::now(),
        };

        self.decisions.lock().unwrap().push(record.clone());
        self.notifications.lock().unwrap().push(summary.to_string());
        Ok(record)
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<String>>,
    fail: bool,
}

#[async_trait]
impl NotifyTransport for RecordingNotifier {
    async fn send(&self, address: &str, _subject: &str, _body: &str) -> Result<(), DispatchError> {
        if self.fail {
            return Err(DispatchError::Gateway { status: 502 });
        }
        self.sent.lock().unwrap().push(address.to_string());
        Ok(())
    }
}

fn raw_input() -> Map<String, Value> {
    json!({
        "name": "Jane",
        "Pregnancies": 2,
        "Glucose": 120.5,
        "BloodPressure": 72,
        "SkinThickness": 20,
        "Insulin": 85,
        "BMI": 28.1,
        "DiabetesPedigreeFunction": 0.52,
        "Age": 33
    })
    .as_object()
    .unwrap()
    .clone()
}

fn outcome(model: &str, prediction: bool, confidence: f64) -> ModelOutcome {
    ModelOutcome {
        model: model.to_string(),
        prediction: Some(prediction),
        confidence: Some(confidence),
    }
}

#[tokio::test]
async fn test_full_pipeline_success() {
    let store = Arc::new(MemoryStore::default());
    let pipeline = Pipeline::new(
        Arc::new(ScriptedScore::ok(vec![
            outcome("logreg", false, 45.0),
            outcome("forest", true, 76.5),
        ])),
        Arc::clone(&store),
        Arc::new(RecordingNotifier::default()),
    );

    let record = pipeline.run("owner-1", None, &raw_input()).await.unwrap();

    assert!(record.decision);
    assert_eq!(record.confidence, 76.5);
    assert_eq!(record.source_model, "forest");
    assert_eq!(record.tier, RiskTier::High);
    assert_eq!(record.measurements.subject_name, "Jane");

    // Decision and notification written together
    assert_eq!(store.decisions.lock().unwrap().len(), 1);
    assert_eq!(store.notifications.lock().unwrap().len(), 1);
    assert!(store.notifications.lock().unwrap()[0].contains("76.5"));
}

#[tokio::test]
async fn test_scoring_outage_leaves_store_untouched() {
    let score = Arc::new(ScriptedScore::unavailable());
    let store = Arc::new(MemoryStore::default());
    let pipeline = Pipeline::new(
        Arc::clone(&score),
        Arc::clone(&store),
        Arc::new(RecordingNotifier::default()),
    );

    let err = pipeline.run("owner-1", None, &raw_input()).await.unwrap_err();

    assert_eq!(err.kind(), "scoring_unavailable");
    assert_eq!(score.calls.load(Ordering::SeqCst), 1);
    assert!(store.decisions.lock().unwrap().is_empty());
    assert!(store.notifications.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_input_fails_before_scoring() {
    let score = Arc::new(ScriptedScore::ok(vec![outcome("m", true, 50.0)]));
    let pipeline = Pipeline::new(
        Arc::clone(&score),
        Arc::new(MemoryStore::default()),
        Arc::new(RecordingNotifier::default()),
    );

    let mut raw = raw_input();
    raw.insert("Glucose".to_string(), json!("abc"));

    let err = pipeline.run("owner-1", None, &raw).await.unwrap_err();
    assert_eq!(err.kind(), "validation_error");
    assert_eq!(score.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_store_failure_is_fatal_and_atomic() {
    let store = Arc::new(MemoryStore {
        fail: true,
        ..Default::default()
    });
    let notifier = Arc::new(RecordingNotifier::default());
    let pipeline = Pipeline::new(
        Arc::new(ScriptedScore::ok(vec![outcome("m", true, 95.0)])),
        Arc::clone(&store),
        Arc::clone(&notifier),
    );

    let err = pipeline
        .run("owner-1", Some("jane@example.com"), &raw_input())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "store_unavailable");
    assert_eq!(err.status_code(), 500);
    // no partial state, no notification attempt
    assert!(store.notifications.lock().unwrap().is_empty());
    assert!(notifier.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_dispatch_never_fails_the_request() {
    let pipeline = Pipeline::new(
        Arc::new(ScriptedScore::ok(vec![outcome("m", true, 95.0)])),
        Arc::new(MemoryStore::default()),
        Arc::new(RecordingNotifier {
            fail: true,
            ..Default::default()
        }),
    );

    let record = pipeline
        .run("owner-1", Some("jane@example.com"), &raw_input())
        .await
        .unwrap();

    assert_eq!(record.tier, RiskTier::Critical);

    let dispatch = pipeline.dispatch(&record, "jane@example.com").await;
    assert!(!dispatch.ok);
    assert!(dispatch.reason.unwrap().contains("502"));
}

#[tokio::test]
async fn test_successful_dispatch_reaches_contact() {
    let notifier = Arc::new(RecordingNotifier::default());
    let pipeline = Pipeline::new(
        Arc::new(ScriptedScore::ok(vec![outcome("m", false, 12.0)])),
        Arc::new(MemoryStore::default()),
        Arc::clone(&notifier),
    );

    let record = pipeline
        .run("owner-1", Some("jane@example.com"), &raw_input())
        .await
        .unwrap();

    let dispatch = pipeline.dispatch(&record, "jane@example.com").await;
    assert!(dispatch.ok);
    assert!(notifier
        .sent
        .lock()
        .unwrap()
        .contains(&"jane@example.com".to_string()));
}
