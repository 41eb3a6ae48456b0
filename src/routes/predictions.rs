use crate::core::{Pipeline, PipelineError};
use crate::models::{
    DecisionListResponse, ErrorResponse, HealthResponse, NotificationListResponse, OwnerQuery,
    PredictRequest, PredictionResponse,
};
use crate::services::{MailGateway, PostgresStore, ScoringClient};
use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

pub type AppPipeline = Pipeline<ScoringClient, PostgresStore, MailGateway>;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AppPipeline>,
    pub store: Arc<PostgresStore>,
}

/// Configure all prediction-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/predictions", web::post().to(create_prediction))
        .route("/predictions", web::get().to(list_predictions))
        .route("/predictions/{id}", web::get().to(get_prediction))
        .route("/notifications", web::get().to(list_notifications))
        .route("/notifications/{id}/read", web::post().to(mark_notification_read));
}

fn pipeline_error_response(err: &PipelineError) -> HttpResponse {
    let status_code = err.status_code();
    let body = ErrorResponse {
        error: err.kind().to_string(),
        message: err.to_string(),
        status_code,
    };
    HttpResponse::build(
        actix_web::http::StatusCode::from_u16(status_code)
            .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR),
    )
    .json(body)
}

fn store_error_response(err: crate::services::PersistenceError) -> HttpResponse {
    pipeline_error_response(&PipelineError::Persistence(err))
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.store.health_check().await.unwrap_or(false);
    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Run the prediction pipeline
///
/// POST /api/v1/predictions
///
/// Request body:
/// ```json
/// {
///   "ownerId": "string",
///   "contactEmail": "string (optional)",
///   "measurements": { "Glucose": 120, ... }
/// }
/// ```
async fn create_prediction(
    state: web::Data<AppState>,
    req: web::Json<PredictRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for prediction request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "validation_error".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    tracing::info!("Running prediction pipeline for owner {}", req.owner_id);

    let result = state
        .pipeline
        .run(&req.owner_id, req.contact_email.as_deref(), &req.measurements)
        .await;

    match result {
        Ok(record) => {
            tracing::info!(
                "Prediction {} persisted for owner {} (tier {})",
                record.id,
                record.owner_id,
                record.tier.as_str()
            );
            HttpResponse::Ok().json(PredictionResponse::from(&record))
        }
        Err(e) => {
            tracing::error!("Prediction pipeline failed for {}: {}", req.owner_id, e);
            pipeline_error_response(&e)
        }
    }
}

/// List decision records for an owner
///
/// GET /api/v1/predictions?ownerId={ownerId}
async fn list_predictions(
    state: web::Data<AppState>,
    query: web::Query<OwnerQuery>,
) -> impl Responder {
    match state.store.list_for_owner(&query.owner_id).await {
        Ok(decisions) => {
            let total = decisions.len();
            HttpResponse::Ok().json(DecisionListResponse { decisions, total })
        }
        Err(e) => {
            tracing::error!("Failed to list decisions for {}: {}", query.owner_id, e);
            store_error_response(e)
        }
    }
}

/// Fetch a single decision record
///
/// GET /api/v1/predictions/{id}
async fn get_prediction(
    state: web::Data<AppState>,
    path: web::Path<uuid::Uuid>,
) -> impl Responder {
    let id = path.into_inner();

    match state.store.get_by_id(id).await {
        Ok(Some(record)) => HttpResponse::Ok().json(record),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse {
            error: "not_found".to_string(),
            message: format!("No decision record with id {}", id),
            status_code: 404,
        }),
        Err(e) => {
            tracing::error!("Failed to fetch decision {}: {}", id, e);
            store_error_response(e)
        }
    }
}

/// List notifications for an owner
///
/// GET /api/v1/notifications?ownerId={ownerId}
async fn list_notifications(
    state: web::Data<AppState>,
    query: web::Query<OwnerQuery>,
) -> impl Responder {
    match state.store.list_notifications(&query.owner_id).await {
        Ok(notifications) => {
            let unread = notifications.iter().filter(|n| n.unread).count();
            HttpResponse::Ok().json(NotificationListResponse {
                notifications,
                unread,
            })
        }
        Err(e) => {
            tracing::error!("Failed to list notifications for {}: {}", query.owner_id, e);
            store_error_response(e)
        }
    }
}

/// Mark a notification as read
///
/// POST /api/v1/notifications/{id}/read
async fn mark_notification_read(
    state: web::Data<AppState>,
    path: web::Path<uuid::Uuid>,
) -> impl Responder {
    let id = path.into_inner();

    match state.store.mark_notification_read(id).await {
        Ok(true) => HttpResponse::Ok().json(serde_json::json!({ "id": id, "unread": false })),
        Ok(false) => HttpResponse::NotFound().json(ErrorResponse {
            error: "not_found".to_string(),
            message: format!("No notification with id {}", id),
            status_code: 404,
        }),
        Err(e) => {
            tracing::error!("Failed to mark notification {} read: {}", id, e);
            store_error_response(e)
        }
    }
}
