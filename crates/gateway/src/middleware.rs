use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Method, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use posgate_auth::{AuthBridge, IdentityStore};

use crate::app::errors::envelope_error;
use crate::context::AuthenticatedIdentity;
use crate::cors::{self, OriginPolicy};

#[derive(Clone)]
pub struct CorsState {
    pub policy: Arc<OriginPolicy>,
    pub session_cookie: String,
}

/// Outermost stage: answers preflights and decorates every other response,
/// including errors and 404s, with exactly one CORS header set.
pub async fn cors_middleware(
    State(state): State<CorsState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let origin = req
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let decision = state.policy.decide(origin.as_deref());

    // Preflight terminates the pipeline before any business logic.
    if req.method() == Method::OPTIONS {
        let mut res = StatusCode::OK.into_response();
        cors::apply(res.headers_mut(), &decision);
        return res;
    }

    let mut res = next.run(req).await;
    cors::apply(res.headers_mut(), &decision);
    if decision.allow_credentials {
        cors::harden_session_cookie(res.headers_mut(), &state.session_cookie);
    }
    res
}

#[derive(Clone)]
pub struct AuthState {
    pub bridge: Arc<AuthBridge>,
    pub store: Arc<dyn IdentityStore>,
}

/// Bearer authentication for protected routes.
///
/// A present `Authorization` header must verify or the request is rejected
/// before business logic. An absent header passes through unchanged: native
/// cookie-session authentication is an external collaborator.
pub async fn authenticate(
    State(state): State<AuthState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if !req.headers().contains_key(header::AUTHORIZATION) {
        return next.run(req).await;
    }

    let token = match extract_bearer(req.headers()) {
        Ok(t) => t.to_string(),
        Err(_) => return unauthorized(),
    };

    let uid = match state.bridge.verify_token(&token, Utc::now()) {
        Ok(uid) => uid,
        Err(e) => {
            tracing::debug!("bearer token rejected: {e}");
            return unauthorized();
        }
    };

    // The identity store may block; keep its call off the runtime threads.
    let store = state.store.clone();
    let subject = match tokio::task::spawn_blocking(move || store.subject_by_uid(uid)).await {
        Ok(Ok(Some(subject))) => subject,
        Ok(Ok(None)) => return unauthorized(),
        Ok(Err(e)) => {
            tracing::error!("identity store fault during token auth: {e}");
            return service_unavailable();
        }
        Err(e) => {
            tracing::error!("identity lookup task failed: {e}");
            return service_unavailable();
        }
    };

    req.extensions_mut()
        .insert(AuthenticatedIdentity::new(subject.uid, subject.login));

    next.run(req).await
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let header = headers
        .get(header::AUTHORIZATION)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(token)
}

fn unauthorized() -> Response {
    envelope_error(StatusCode::UNAUTHORIZED, "Invalid or expired token")
}

fn service_unavailable() -> Response {
    envelope_error(StatusCode::INTERNAL_SERVER_ERROR, "Authentication service unavailable")
}
