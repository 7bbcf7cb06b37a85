use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::models::{
    AddSymptomRequest, AnalyzeRequest, InitSessionResponse, RemoveSymptomRequest,
    SessionSymptomsResponse, SuccessResponse,
};
use tracing::debug;

use super::AppState;
use super::errors::diagnosis_error_response;

pub(super) async fn init_session(State(state): State<AppState>) -> impl IntoResponse {
    let session_id = state.diagnosis.sessions().create_session();

    (
        StatusCode::OK,
        Json(InitSessionResponse {
            session_id: session_id.to_string(),
            status: "created".to_string(),
        }),
    )
}

pub(super) async fn add_symptom(
    State(state): State<AppState>,
    Json(req): Json<AddSymptomRequest>,
) -> impl IntoResponse {
    let duration_days = req.duration_days();
    let intensity = req.intensity();

    state
        .diagnosis
        .sessions()
        .add_symptom(req.session_id(), req.symptom(), duration_days, intensity);
    debug!(
        has_duration = duration_days.is_some(),
        has_intensity = intensity.is_some(),
        "symptom add processed"
    );

    (StatusCode::OK, Json(SuccessResponse { success: true }))
}

pub(super) async fn remove_symptom(
    State(state): State<AppState>,
    Json(req): Json<RemoveSymptomRequest>,
) -> impl IntoResponse {
    state
        .diagnosis
        .sessions()
        .remove_symptom(req.session_id(), req.symptom());

    (StatusCode::OK, Json(SuccessResponse { success: true }))
}

pub(super) async fn list_symptoms(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let symptoms = state.diagnosis.sessions().get_symptoms(&session_id);

    (
        StatusCode::OK,
        Json(SessionSymptomsResponse {
            session_id,
            symptoms,
        }),
    )
}

pub(super) async fn analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Response {
    let profile = req.patient_profile();

    match state.diagnosis.analyze(req.session_id(), &profile).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => diagnosis_error_response(err),
    }
}
