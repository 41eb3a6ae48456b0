use crate::core::pipeline::DecisionStore;
use crate::models::{DecisionRecord, MeasurementSet, NotificationRecord, RiskTier};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Errors from the durable record store
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("record store reference invalid: {0}")]
    InvalidReference(String),

    #[error("conflicting record: {0}")]
    Conflict(String),

    #[error("record store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<sqlx::Error> for PersistenceError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            match db.code().as_deref() {
                Some("23503") => return PersistenceError::InvalidReference(db.message().to_string()),
                Some("23505") => return PersistenceError::Conflict(db.message().to_string()),
                _ => {}
            }
        }
        PersistenceError::StoreUnavailable(e.to_string())
    }
}

/// Decision fields as computed by the pipeline, before the store assigns
/// identity and creation timestamp.
#[derive(Debug, Clone)]
pub struct NewDecision {
    pub owner_id: String,
    pub measurements: MeasurementSet,
    pub decision: bool,
    pub confidence: f64,
    pub source_model: String,
    pub tier: RiskTier,
    pub recommendation: String,
}

/// PostgreSQL-backed record store
///
/// Owns the durable side of the pipeline: the decision row and its
/// notification row are written in one transaction, so either both are
/// visible to subsequent reads or neither is. Read paths back the CRUD
/// listing endpoints.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, PersistenceError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| PersistenceError::StoreUnavailable(e.to_string()))?;

        Ok(Self { pool })
    }

    /// List decision records for an owner, newest first.
    pub async fn list_for_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<DecisionRecord>, PersistenceError> {
        let query = r#"
            SELECT id, owner_id, subject_name, pregnancies, glucose, blood_pressure,
                   skin_thickness, insulin, bmi, diabetes_pedigree, age,
                   decision, confidence, source_model, tier, recommendation, created_at
            FROM decision_records
            WHERE owner_id = $1
            ORDER BY created_at DESC
        "#;

        let rows = sqlx::query(query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(decision_from_row).collect())
    }

    /// Fetch a single decision record by id.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<DecisionRecord>, PersistenceError> {
        let query = r#"
            SELECT id, owner_id, subject_name, pregnancies, glucose, blood_pressure,
                   skin_thickness, insulin, bmi, diabetes_pedigree, age,
                   decision, confidence, source_model, tier, recommendation, created_at
            FROM decision_records
            WHERE id = $1
        "#;

        let row = sqlx::query(query).bind(id).fetch_optional(&self.pool).await?;

        Ok(row.as_ref().map(decision_from_row))
    }

    /// List notification records for an owner, newest first.
    pub async fn list_notifications(
        &self,
        owner_id: &str,
    ) -> Result<Vec<NotificationRecord>, PersistenceError> {
        let query = r#"
            SELECT id, decision_id, owner_id, summary, unread, created_at
            FROM notification_records
            WHERE owner_id = $1
            ORDER BY created_at DESC
        "#;

        let rows = sqlx::query(query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| NotificationRecord {
                id: row.get("id"),
                decision_id: row.get("decision_id"),
                owner_id: row.get("owner_id"),
                summary: row.get("summary"),
                unread: row.get("unread"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    /// Clear the unread flag on a notification. Returns false when the id
    /// does not exist.
    pub async fn mark_notification_read(&self, id: Uuid) -> Result<bool, PersistenceError> {
        let result = sqlx::query("UPDATE notification_records SET unread = FALSE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PersistenceError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

#[async_trait]
impl DecisionStore for PostgresStore {
    /// Write the decision and its notification as one atomic unit.
    async fn create_decision_with_notification(
        &self,
        decision: NewDecision,
        summary: &str,
    ) -> Result<DecisionRecord, PersistenceError> {
        let mut tx = self.pool.begin().await?;

        let decision_id = Uuid::new_v4();
        let insert_decision = r#"
            INSERT INTO decision_records (
                id, owner_id, subject_name, pregnancies, glucose, blood_pressure,
                skin_thickness, insulin, bmi, diabetes_pedigree, age,
                decision, confidence, source_model, tier, recommendation
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING created_at
        "#;

        let row = sqlx::query(insert_decision)
            .bind(decision_id)
            .bind(&decision.owner_id)
            .bind(&decision.measurements.subject_name)
            .bind(decision.measurements.pregnancies as i32)
            .bind(decision.measurements.glucose)
            .bind(decision.measurements.blood_pressure)
            .bind(decision.measurements.skin_thickness)
            .bind(decision.measurements.insulin)
            .bind(decision.measurements.bmi)
            .bind(decision.measurements.diabetes_pedigree)
            .bind(decision.measurements.age as i32)
            .bind(decision.decision)
            .bind(decision.confidence)
            .bind(&decision.source_model)
            .bind(decision.tier.as_str())
            .bind(&decision.recommendation)
            .fetch_one(&mut *tx)
            .await?;

        let created_at: DateTime<Utc> = row.get("created_at");

        let insert_notification = r#"
            INSERT INTO notification_records (id, decision_id, owner_id, summary, unread)
            VALUES ($1, $2, $3, $4, TRUE)
        "#;

        sqlx::query(insert_notification)
            .bind(Uuid::new_v4())
            .bind(decision_id)
            .bind(&decision.owner_id)
            .bind(summary)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(
            "Persisted decision {} for owner {} ({})",
            decision_id,
            decision.owner_id,
            decision.tier.as_str()
        );

        Ok(DecisionRecord {
            id: decision_id,
            owner_id: decision.owner_id,
            measurements: decision.measurements,
            decision: decision.decision,
            confidence: decision.confidence,
            source_model: decision.source_model,
            tier: decision.tier,
            recommendation: decision.recommendation,
            created_at,
        })
    }
}

fn decision_from_row(row: &PgRow) -> DecisionRecord {
    let tier: String = row.get("tier");
    DecisionRecord {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        measurements: MeasurementSet {
            subject_name: row.get("subject_name"),
            pregnancies: row.get::<i32, _>("pregnancies") as u32,
            glucose: row.get("glucose"),
            blood_pressure: row.get("blood_pressure"),
            skin_thickness: row.get("skin_thickness"),
            insulin: row.get("insulin"),
            bmi: row.get("bmi"),
            diabetes_pedigree: row.get("diabetes_pedigree"),
            age: row.get::<i32, _>("age") as u32,
        },
        decision: row.get("decision"),
        confidence: row.get("confidence"),
        source_model: row.get("source_model"),
        tier: RiskTier::from_str_lossy(&tier),
        recommendation: row.get("recommendation"),
        created_at: row.get("created_at"),
    }
}
