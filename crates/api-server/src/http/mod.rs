use axum::Router;
use axum::routing::{get, post};
use shared::diagnosis::DiagnosisService;

mod diagnosis;
mod errors;
mod health;
mod symptoms;

#[derive(Clone)]
pub struct AppState {
    pub diagnosis: DiagnosisService,
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health))
        .route("/api/diagnosis/init", post(diagnosis::init_session))
        .route("/api/diagnosis/add-symptom", post(diagnosis::add_symptom))
        .route(
            "/api/diagnosis/remove-symptom",
            post(diagnosis::remove_symptom),
        )
        .route(
            "/api/diagnosis/symptoms/{session_id}",
            get(diagnosis::list_symptoms),
        )
        .route("/api/diagnosis/analyze", post(diagnosis::analyze))
        .route("/api/symptoms/search", get(symptoms::search))
        .fallback(errors::not_found)
        .with_state(app_state)
}
