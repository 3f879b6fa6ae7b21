//! Read API and scheduler-toggle HTTP surface.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use domain_messages::MessageError;
use serde::Serialize;
use serde_json::json;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/messages/sent", get(list_sent_messages))
        .route("/api/v1/scheduler/toggle", post(toggle_scheduler))
        .route("/health", get(health))
        .route("/ready", get(ready))
        .with_state(state)
}

struct ApiError(MessageError);

impl From<MessageError> for ApiError {
    fn from(err: MessageError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            MessageError::InvalidCursor(_) | MessageError::InvalidLimit(_) => {
                StatusCode::BAD_REQUEST
            }
            MessageError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

async fn list_sent_messages(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = domain_messages::query::parse_limit(params.get("limit").map(String::as_str))?;
    let after = domain_messages::query::parse_after(params.get("after").map(String::as_str))?;

    let response = state.query_service.list_sent_messages(after, limit).await?;
    Ok(Json(response))
}

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
}

async fn toggle_scheduler(State(state): State<AppState>) -> impl IntoResponse {
    if state.scheduler.is_running().await {
        state.scheduler.stop().await;
        Json(StatusResponse { status: "Scheduler stopped" })
    } else {
        state.scheduler.start().await;
        Json(StatusResponse { status: "Scheduler started" })
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

#[derive(Serialize)]
struct ReadyResponse {
    status: &'static str,
    database: &'static str,
    cache: &'static str,
}

async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    use sea_orm::ConnectionTrait;

    let db_check = state.db.execute_unprepared("SELECT 1");
    let cache_check = async {
        let mut conn = state.redis.clone();
        redis::cmd("PING").query_async::<String>(&mut conn).await
    };

    let (db_result, cache_result) = tokio::join!(db_check, cache_check);

    let database = db_result.is_ok();
    let cache = cache_result.is_ok();

    let body = ReadyResponse {
        status: if database && cache { "ready" } else { "not ready" },
        database: if database { "healthy" } else { "unhealthy" },
        cache: if cache { "healthy" } else { "unhealthy" },
    };

    let status = if database && cache {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(body))
}
