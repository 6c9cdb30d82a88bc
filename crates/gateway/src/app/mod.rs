//! HTTP application wiring (axum router + middleware chain).
//!
//! The pipeline is composed once at startup, each concern a discrete stage:
//! CORS decoration outermost (preflight short-circuit + header application
//! on every path), bearer verification on protected routes, then handlers.

use std::sync::Arc;

use axum::{
    Extension, Router,
    routing::{get, post},
};
use tower::ServiceBuilder;

use posgate_auth::{AuthBridge, IdentityStore, TokenCodec};

use crate::config::GatewayConfig;
use crate::cors::OriginPolicy;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(config: &GatewayConfig, store: Arc<dyn IdentityStore>) -> Router {
    let codec = TokenCodec::new(config.jwt_secret.as_bytes(), config.token_ttl);
    let bridge = Arc::new(AuthBridge::new(store.clone(), codec));

    let auth_state = middleware::AuthState {
        bridge: bridge.clone(),
        store,
    };
    let cors_state = middleware::CorsState {
        policy: Arc::new(OriginPolicy::new(
            config.allowed_origins.clone(),
            config.dev_origin.clone(),
        )),
        session_cookie: config.session_cookie.clone(),
    };

    // Protected routes: bearer verification before any handler runs.
    let protected = Router::new()
        .route("/whoami", get(routes::whoami))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::authenticate,
        ));

    Router::new()
        .route("/health", get(routes::health))
        .route("/sign-in", post(routes::sign_in))
        .merge(protected)
        .layer(Extension(bridge))
        // Outermost so every path, including errors and unmatched routes,
        // carries the CORS header set exactly once.
        .layer(axum::middleware::from_fn_with_state(
            cors_state,
            middleware::cors_middleware,
        ))
        .layer(ServiceBuilder::new())
}
