use std::sync::Arc;
use std::time::Duration;

use api_server::http::{AppState, build_router};
use shared::diagnosis::DiagnosisService;
use shared::llm::LlmGateway;
use shared::sessions::SessionStore;

use super::fake_model::FakeModel;

const TEST_SESSION_TTL: Duration = Duration::from_secs(600);

pub fn build_test_router(model: &Arc<FakeModel>) -> axum::Router {
    let gateway: Arc<dyn LlmGateway> = model.clone();
    build_router(AppState {
        diagnosis: DiagnosisService::new(SessionStore::new(TEST_SESSION_TTL), Some(gateway)),
    })
}

pub fn build_unconfigured_router() -> axum::Router {
    build_router(AppState {
        diagnosis: DiagnosisService::new(SessionStore::new(TEST_SESSION_TTL), None),
    })
}
