use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use shared::models::HealthResponse;

use super::AppState;

pub(super) async fn health(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            model_configured: state.diagnosis.is_model_configured(),
            timestamp: Utc::now(),
        }),
    )
}
