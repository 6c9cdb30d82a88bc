use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// A verified subject as the identity store knows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub uid: i64,
    pub login: String,
    pub display_name: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// Unknown login or wrong password. Intentionally one variant: callers
    /// must not be able to enumerate users.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The tenant/database the login was scoped to does not exist.
    #[error("unknown tenant '{0}'")]
    UnknownTenant(String),

    /// The backing store could not be reached or answered abnormally.
    #[error("identity store unavailable: {0}")]
    Unavailable(String),
}

/// External collaborator holding user records and checking passwords.
///
/// Implementations may block (network, database); callers are expected to
/// isolate the call from the async runtime.
pub trait IdentityStore: Send + Sync {
    /// Verify `login`/`password` within `tenant`. Unknown user and wrong
    /// password are indistinguishable in the result.
    fn verify(&self, tenant: &str, login: &str, password: &str) -> Result<Subject, IdentityError>;

    /// Record a successful sign-in. Best-effort: the bridge logs failures
    /// and proceeds.
    fn touch_last_login(&self, tenant: &str, uid: i64) -> Result<(), IdentityError>;

    /// Resolve the attributes of a previously verified subject. `Ok(None)`
    /// means the subject no longer exists (e.g. deactivated after the token
    /// was issued).
    fn subject_by_uid(&self, uid: i64) -> Result<Option<Subject>, IdentityError>;
}

/// In-memory identity store for dev mode and tests.
#[derive(Default)]
pub struct InMemoryIdentityStore {
    tenants: HashMap<String, Vec<UserRecord>>,
    last_logins: Mutex<HashMap<(String, i64), DateTime<Utc>>>,
}

struct UserRecord {
    uid: i64,
    login: String,
    password: String,
    display_name: String,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(
        &mut self,
        tenant: &str,
        uid: i64,
        login: &str,
        password: &str,
        display_name: &str,
    ) {
        self.tenants.entry(tenant.to_string()).or_default().push(UserRecord {
            uid,
            login: login.to_string(),
            password: password.to_string(),
            display_name: display_name.to_string(),
        });
    }

    pub fn last_login(&self, tenant: &str, uid: i64) -> Option<DateTime<Utc>> {
        self.last_logins
            .lock()
            .unwrap()
            .get(&(tenant.to_string(), uid))
            .copied()
    }
}

impl IdentityStore for InMemoryIdentityStore {
    fn verify(&self, tenant: &str, login: &str, password: &str) -> Result<Subject, IdentityError> {
        let users = self
            .tenants
            .get(tenant)
            .ok_or_else(|| IdentityError::UnknownTenant(tenant.to_string()))?;

        users
            .iter()
            .find(|u| u.login == login && u.password == password)
            .map(|u| Subject {
                uid: u.uid,
                login: u.login.clone(),
                display_name: u.display_name.clone(),
            })
            .ok_or(IdentityError::InvalidCredentials)
    }

    fn touch_last_login(&self, tenant: &str, uid: i64) -> Result<(), IdentityError> {
        self.last_logins
            .lock()
            .unwrap()
            .insert((tenant.to_string(), uid), Utc::now());
        Ok(())
    }

    fn subject_by_uid(&self, uid: i64) -> Result<Option<Subject>, IdentityError> {
        Ok(self
            .tenants
            .values()
            .flatten()
            .find(|u| u.uid == uid)
            .map(|u| Subject {
                uid: u.uid,
                login: u.login.clone(),
                display_name: u.display_name.clone(),
            }))
    }
}
