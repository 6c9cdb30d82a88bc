use chrono::Duration;

use posgate_auth::TokenCodec;

/// Process-wide gateway configuration.
///
/// Loaded once at startup from the environment and read-only thereafter;
/// every request shares the same immutable values.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Secret the token codec signs with (`POSGATE_JWT_SECRET`).
    pub jwt_secret: String,

    /// Exact-match origin allow-list (`POSGATE_ALLOWED_ORIGINS`,
    /// comma-separated).
    pub allowed_origins: Vec<String>,

    /// The one origin echoed back to untrusted callers
    /// (`POSGATE_DEV_ORIGIN`). An explicit value, never a hidden default:
    /// failing open to `*` with credentials enabled is the defect this
    /// gateway exists to remove.
    pub dev_origin: String,

    /// Bearer token lifetime (`POSGATE_TOKEN_TTL_DAYS`).
    pub token_ttl: Duration,

    /// Name of the session cookie to harden for cross-origin use
    /// (`POSGATE_SESSION_COOKIE`).
    pub session_cookie: String,

    /// Listen address (`POSGATE_BIND`).
    pub bind: String,
}

/// The POS web client's Vite dev server.
const DEFAULT_DEV_ORIGIN: &str = "http://localhost:5173";

impl GatewayConfig {
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("POSGATE_JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("POSGATE_JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        let allowed_origins = std::env::var("POSGATE_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_else(|_| vec![DEFAULT_DEV_ORIGIN.to_string()]);

        let dev_origin =
            std::env::var("POSGATE_DEV_ORIGIN").unwrap_or_else(|_| DEFAULT_DEV_ORIGIN.to_string());

        let ttl_days = std::env::var("POSGATE_TOKEN_TTL_DAYS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(TokenCodec::DEFAULT_LIFETIME_DAYS);

        let session_cookie =
            std::env::var("POSGATE_SESSION_COOKIE").unwrap_or_else(|_| "session_id".to_string());

        let bind = std::env::var("POSGATE_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        Self {
            jwt_secret,
            allowed_origins,
            dev_origin,
            token_ttl: Duration::days(ttl_days),
            session_cookie,
            bind,
        }
    }

    /// Fixed configuration for tests: no environment reads.
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            jwt_secret: jwt_secret.to_string(),
            allowed_origins: vec![DEFAULT_DEV_ORIGIN.to_string()],
            dev_origin: DEFAULT_DEV_ORIGIN.to_string(),
            token_ttl: Duration::days(TokenCodec::DEFAULT_LIFETIME_DAYS),
            session_cookie: "session_id".to_string(),
            bind: "127.0.0.1:0".to_string(),
        }
    }
}
