//! Origin policy and CORS response decoration.
//!
//! Credentialed cross-origin requests must be answered with a *specific*
//! origin — `*` together with `Access-Control-Allow-Credentials: true` is
//! rejected by browsers — so the policy echoes trusted origins and falls
//! back to one explicitly configured development origin for everything else.

use axum::http::{HeaderMap, HeaderValue, header};

/// Headers a client may send on the actual request.
pub const ALLOW_HEADERS: &str =
    "origin, x-csrftoken, content-type, accept, x-session-id, authorization";

/// Methods the gateway answers for.
pub const ALLOW_METHODS: &str = "GET, POST, PUT, OPTIONS, DELETE, PATCH";

/// How long a browser may cache a preflight answer, in seconds.
pub const MAX_AGE_SECS: u32 = 86_400;

/// The CORS answer for one request. Computed once per request by
/// [`OriginPolicy::decide`], immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsDecision {
    pub allow_origin: String,
    pub allow_credentials: bool,
    pub allow_headers: &'static str,
    pub allow_methods: &'static str,
    pub max_age_secs: u32,
}

impl CorsDecision {
    fn new(allow_origin: String, allow_credentials: bool) -> Self {
        Self {
            allow_origin,
            allow_credentials,
            allow_headers: ALLOW_HEADERS,
            allow_methods: ALLOW_METHODS,
            max_age_secs: MAX_AGE_SECS,
        }
    }
}

/// Decides, per request, whether an `Origin` header is trusted and what
/// `Access-Control-Allow-Origin` value to echo.
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    allowed: Vec<String>,
    dev_origin: String,
}

impl OriginPolicy {
    pub fn new(allowed: Vec<String>, dev_origin: String) -> Self {
        Self { allowed, dev_origin }
    }

    pub fn decide(&self, origin: Option<&str>) -> CorsDecision {
        match origin {
            // No Origin header means no credentialed browser context; the
            // wildcard is only ever paired with credentials off.
            None => CorsDecision::new("*".to_string(), false),
            Some(o) if self.is_trusted(o) => CorsDecision::new(o.to_string(), true),
            // Fail closed: untrusted origins get the configured development
            // origin echoed back, which the browser will refuse to match.
            Some(_) => CorsDecision::new(self.dev_origin.clone(), true),
        }
    }

    /// Exact-match against the allow-list, plus the `null` sentinel and
    /// `file://`-derived origins used by packaged POS displays.
    fn is_trusted(&self, origin: &str) -> bool {
        self.allowed.iter().any(|a| a == origin)
            || origin == "null"
            || origin.starts_with("file://")
    }
}

/// Attach the decision's headers to a response.
///
/// `HeaderMap::insert` replaces any existing value, so applying a decision
/// twice still yields exactly one value per header.
pub fn apply(headers: &mut HeaderMap, decision: &CorsDecision) {
    let origin = HeaderValue::from_str(&decision.allow_origin)
        .unwrap_or_else(|_| HeaderValue::from_static("null"));

    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(decision.allow_headers),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static(if decision.allow_credentials { "true" } else { "false" }),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(decision.allow_methods),
    );
    headers.insert(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from(decision.max_age_secs));
}

/// Rewrite any outbound `Set-Cookie` for the session cookie so it survives a
/// cross-origin credentialed context: `SameSite=None` requires `Secure`, and
/// the session cookie additionally stays `HttpOnly`.
pub fn harden_session_cookie(headers: &mut HeaderMap, cookie_name: &str) {
    let prefix = format!("{cookie_name}=");
    let cookies: Vec<HeaderValue> = headers.get_all(header::SET_COOKIE).iter().cloned().collect();
    if cookies.is_empty() {
        return;
    }

    headers.remove(header::SET_COOKIE);
    for value in cookies {
        let rewritten = value
            .to_str()
            .ok()
            .filter(|s| s.starts_with(&prefix))
            .map(cross_origin_cookie)
            .and_then(|s| HeaderValue::from_str(&s).ok());

        headers.append(header::SET_COOKIE, rewritten.unwrap_or(value));
    }
}

fn cross_origin_cookie(cookie: &str) -> String {
    let kept: Vec<&str> = cookie
        .split(';')
        .map(str::trim)
        .filter(|part| {
            let attr = part.split('=').next().unwrap_or("").trim().to_ascii_lowercase();
            !matches!(attr.as_str(), "samesite" | "secure" | "httponly")
        })
        .collect();

    let mut hardened = kept.join("; ");
    hardened.push_str("; SameSite=None; Secure; HttpOnly");
    hardened
}
