use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use posgate_auth::AuthBridge;

use crate::app::{dto, errors};
use crate::context::AuthenticatedIdentity;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// `POST /sign-in`: credential check, token issuance.
///
/// The body is parsed by hand so a malformed payload maps to the client's
/// expected `Invalid JSON data` answer instead of a framework rejection.
pub async fn sign_in(Extension(bridge): Extension<Arc<AuthBridge>>, body: Bytes) -> Response {
    let request: dto::SignInRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(_) => return errors::envelope_error(StatusCode::BAD_REQUEST, "Invalid JSON data"),
    };
    let credential = request.into_credential();

    // The credential check may block on the backing store; keep it off the
    // runtime threads so one slow sign-in never stalls unrelated requests.
    match tokio::task::spawn_blocking(move || bridge.sign_in(&credential)).await {
        Ok(Ok(signed)) => (StatusCode::OK, Json(dto::sign_in_ok(signed))).into_response(),
        Ok(Err(e)) => errors::auth_error_to_response(e),
        Err(e) => {
            tracing::error!("sign-in task failed: {e}");
            errors::envelope_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authentication service unavailable",
            )
        }
    }
}

/// `GET /whoami`: echoes the identity the token middleware attached.
pub async fn whoami(identity: Option<Extension<AuthenticatedIdentity>>) -> Response {
    match identity {
        Some(Extension(identity)) => Json(json!({
            "uid": identity.uid(),
            "login": identity.login(),
        }))
        .into_response(),
        None => errors::envelope_error(StatusCode::UNAUTHORIZED, "Authentication required"),
    }
}
