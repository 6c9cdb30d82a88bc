use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use posgate_auth::AuthError;

/// The uniform error envelope every failure is reduced to at the gateway
/// boundary. No internal detail, no stack traces, no store identifiers.
pub fn envelope_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        Json(json!({
            "success": false,
            "error": message.into(),
        })),
    )
        .into_response()
}

pub fn auth_error_to_response(err: AuthError) -> axum::response::Response {
    let status = match err {
        AuthError::MissingParameter(_) => StatusCode::BAD_REQUEST,
        AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AuthError::SystemFault => StatusCode::INTERNAL_SERVER_ERROR,
    };
    envelope_error(status, err.to_string())
}
