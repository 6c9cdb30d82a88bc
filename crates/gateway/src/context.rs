/// Authenticated identity for a request (bearer token already verified).
///
/// Attached to the request's extensions by the token middleware and owned by
/// that single request; nothing outlives it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    uid: i64,
    login: String,
}

impl AuthenticatedIdentity {
    pub fn new(uid: i64, login: String) -> Self {
        Self { uid, login }
    }

    pub fn uid(&self) -> i64 {
        self.uid
    }

    pub fn login(&self) -> &str {
        &self.login
    }
}
