use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::claims::TokenError;
use crate::codec::TokenCodec;
use crate::identity::{IdentityError, IdentityStore};

/// A sign-in attempt. Transient: lives for the duration of one attempt and
/// is never persisted. The password is deliberately excluded from `Debug`.
#[derive(Clone)]
pub struct Credential {
    pub db: String,
    pub login: String,
    pub password: String,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("db", &self.db)
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful sign-in: the issued token plus minimal identity fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedIn {
    pub access_token: String,
    pub uid: i64,
    pub name: String,
    pub login: String,
    pub db_name: String,
}

/// Uniform failure shape for the sign-in boundary.
///
/// Display strings are the client-facing messages; internal detail (store
/// faults) is logged inside the bridge and never carried here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("{0} is required")]
    MissingParameter(&'static str),

    /// Unknown login and wrong password collapse into this one answer.
    #[error("Incorrect login name or password")]
    InvalidCredentials,

    #[error("Authentication service unavailable")]
    SystemFault,
}

/// Validates credentials against the identity store and issues tokens.
pub struct AuthBridge {
    store: Arc<dyn IdentityStore>,
    codec: TokenCodec,
}

impl AuthBridge {
    pub fn new(store: Arc<dyn IdentityStore>, codec: TokenCodec) -> Self {
        Self { store, codec }
    }

    /// Verify a bearer token, returning the subject id it was issued for.
    pub fn verify_token(&self, token: &str, now: DateTime<Utc>) -> Result<i64, TokenError> {
        self.codec.verify(token, now)
    }

    /// One independent sign-in attempt: no server-side state survives it.
    pub fn sign_in(&self, credential: &Credential) -> Result<SignedIn, AuthError> {
        if credential.db.is_empty() {
            return Err(AuthError::MissingParameter("Database name"));
        }
        if credential.login.is_empty() {
            return Err(AuthError::MissingParameter("Login"));
        }
        if credential.password.is_empty() {
            return Err(AuthError::MissingParameter("Password"));
        }

        let subject = self
            .store
            .verify(&credential.db, &credential.login, &credential.password)
            .map_err(|e| match e {
                IdentityError::InvalidCredentials => AuthError::InvalidCredentials,
                IdentityError::UnknownTenant(_) | IdentityError::Unavailable(_) => {
                    tracing::error!(db = %credential.db, "identity store fault during sign-in: {e}");
                    AuthError::SystemFault
                }
            })?;

        let now = Utc::now();
        let access_token = self.codec.issue(subject.uid, now).map_err(|e| {
            tracing::error!(uid = subject.uid, "token issuance failed: {e}");
            AuthError::SystemFault
        })?;

        // Best-effort: a failed last-login update never fails the sign-in.
        if let Err(e) = self.store.touch_last_login(&credential.db, subject.uid) {
            tracing::warn!(uid = subject.uid, "last-login update failed: {e}");
        }

        Ok(SignedIn {
            access_token,
            uid: subject.uid,
            name: subject.display_name,
            login: subject.login,
            db_name: credential.db.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{InMemoryIdentityStore, Subject};

    fn bridge() -> AuthBridge {
        let mut store = InMemoryIdentityStore::new();
        store.add_user("acme", 2, "a@example.com", "s3cret", "Ada");
        AuthBridge::new(Arc::new(store), TokenCodec::with_default_lifetime(b"test-secret"))
    }

    fn cred(db: &str, login: &str, password: &str) -> Credential {
        Credential {
            db: db.to_string(),
            login: login.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn sign_in_issues_a_verifiable_token() {
        let b = bridge();
        let signed = b.sign_in(&cred("acme", "a@example.com", "s3cret")).unwrap();

        assert_eq!(signed.uid, 2);
        assert_eq!(signed.name, "Ada");
        assert_eq!(signed.login, "a@example.com");
        assert_eq!(signed.db_name, "acme");
        assert_eq!(b.verify_token(&signed.access_token, Utc::now()), Ok(2));
    }

    #[test]
    fn empty_parameters_are_rejected_before_the_store_is_consulted() {
        let b = bridge();
        assert_eq!(
            b.sign_in(&cred("", "a@example.com", "s3cret")),
            Err(AuthError::MissingParameter("Database name"))
        );
        assert_eq!(
            b.sign_in(&cred("acme", "", "s3cret")),
            Err(AuthError::MissingParameter("Login"))
        );
        assert_eq!(
            b.sign_in(&cred("acme", "a@example.com", "")),
            Err(AuthError::MissingParameter("Password"))
        );
    }

    #[test]
    fn wrong_password_maps_to_invalid_credentials() {
        let b = bridge();
        assert_eq!(
            b.sign_in(&cred("acme", "a@example.com", "wrong")),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[test]
    fn store_faults_map_to_system_fault_not_invalid_credentials() {
        let b = bridge();
        assert_eq!(
            b.sign_in(&cred("ghost", "a@example.com", "s3cret")),
            Err(AuthError::SystemFault)
        );
    }

    #[test]
    fn failed_last_login_update_does_not_fail_the_sign_in() {
        struct TouchyStore;

        impl IdentityStore for TouchyStore {
            fn verify(&self, _: &str, _: &str, _: &str) -> Result<Subject, IdentityError> {
                Ok(Subject {
                    uid: 9,
                    login: "b@example.com".to_string(),
                    display_name: "Bea".to_string(),
                })
            }

            fn touch_last_login(&self, _: &str, _: i64) -> Result<(), IdentityError> {
                Err(IdentityError::Unavailable("marker write failed".to_string()))
            }

            fn subject_by_uid(&self, _: i64) -> Result<Option<Subject>, IdentityError> {
                Ok(None)
            }
        }

        let b = AuthBridge::new(
            Arc::new(TouchyStore),
            TokenCodec::with_default_lifetime(b"test-secret"),
        );
        let signed = b.sign_in(&cred("acme", "b@example.com", "pw")).unwrap();
        assert_eq!(signed.uid, 9);
    }

    #[test]
    fn credential_debug_never_prints_the_password() {
        let c = cred("acme", "a@example.com", "s3cret");
        let printed = format!("{c:?}");
        assert!(!printed.contains("s3cret"));
        assert!(printed.contains("<redacted>"));
    }
}
