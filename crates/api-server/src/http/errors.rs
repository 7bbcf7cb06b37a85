use axum::Json;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use shared::diagnosis::DiagnosisError;
use shared::models::{ErrorBody, ErrorResponse};
use tracing::{error, warn};

pub(super) fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: message.to_string(),
            },
        }),
    )
        .into_response()
}

/// Maps analysis failures onto the stable error shape. The cause and the
/// triage outcome are logged here and never echoed to the client.
pub(super) fn diagnosis_error_response(err: DiagnosisError) -> Response {
    let emergency = err.emergency();
    let is_emergency = emergency.is_emergency;
    let emergency_reason = emergency.reason.as_deref().unwrap_or("none");

    match &err {
        DiagnosisError::ModelNotConfigured { .. } => {
            error!(
                is_emergency,
                emergency_reason, "diagnosis model credential is missing"
            );
            error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                "model_not_configured",
                "Diagnosis service is not configured",
            )
        }
        DiagnosisError::Upstream { source, .. } => {
            warn!(
                is_emergency,
                emergency_reason, "diagnosis model call failed: {source}"
            );
            error_response(
                StatusCode::BAD_GATEWAY,
                "upstream_unavailable",
                "Diagnosis service is temporarily unavailable",
            )
        }
        DiagnosisError::Analysis { source, .. } => {
            warn!(
                is_emergency,
                emergency_reason, "diagnosis model reply rejected: {source}"
            );
            error_response(
                StatusCode::BAD_GATEWAY,
                "analysis_failed",
                "Diagnosis service returned an unreadable answer",
            )
        }
    }
}

pub(super) async fn not_found(method: Method, uri: Uri) -> Response {
    warn!(%method, path = uri.path(), "route not found");
    error_response(StatusCode::NOT_FOUND, "not_found", "Route not found")
}
