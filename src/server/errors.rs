use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use crate::error::NudgerError;

pub fn nudger_error_to_response(err: NudgerError) -> axum::response::Response {
    match err {
        NudgerError::NotFound { .. } => json_error(StatusCode::NOT_FOUND, "not_found", err.to_string()),
        NudgerError::Unauthorized => json_error(StatusCode::UNAUTHORIZED, "unauthorized", "Unauthorized"),
        NudgerError::Delivery(_) => json_error(StatusCode::BAD_GATEWAY, "delivery_failed", err.to_string()),
        NudgerError::InvalidInput(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_input", msg),
        other => {
            tracing::error!(error = %other, "request failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", other.to_string())
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
