use axum::Json;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;
use shared::catalog;
use shared::models::SymptomSearchResponse;

#[derive(Debug, Deserialize)]
pub(super) struct SymptomSearchQuery {
    #[serde(default)]
    q: String,
}

pub(super) async fn search(Query(query): Query<SymptomSearchQuery>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(SymptomSearchResponse {
            symptoms: catalog::search(&query.q),
        }),
    )
}
