use serde::Deserialize;
use serde_json::json;

use posgate_auth::{Credential, SignedIn};

/// Sign-in request body.
///
/// Accepts both the flat shape `{db, login, password}` and the RPC-style
/// `{params: {db, login, password}}` wrapper; older POS clients also send
/// `db_name` instead of `db`.
#[derive(Debug, Default, Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub db: Option<String>,
    #[serde(default)]
    pub db_name: Option<String>,
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub params: Option<Box<SignInRequest>>,
}

impl SignInRequest {
    /// Flatten into a credential; missing fields become empty strings and
    /// are rejected by the bridge's parameter validation.
    pub fn into_credential(self) -> Credential {
        let flat = match self.params {
            Some(params) => *params,
            None => self,
        };

        Credential {
            db: flat.db.or(flat.db_name).unwrap_or_default(),
            login: flat.login.unwrap_or_default(),
            password: flat.password.unwrap_or_default(),
        }
    }
}

pub fn sign_in_ok(signed: SignedIn) -> serde_json::Value {
    json!({
        "success": true,
        "data": {
            "access_token": signed.access_token,
            "db_name": signed.db_name,
            "uid": signed.uid,
            "name": signed.name,
            "username": signed.login,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_body_parses() {
        let req: SignInRequest =
            serde_json::from_str(r#"{"db":"acme","login":"a@example.com","password":"pw"}"#)
                .unwrap();
        let cred = req.into_credential();
        assert_eq!(cred.db, "acme");
        assert_eq!(cred.login, "a@example.com");
        assert_eq!(cred.password, "pw");
    }

    #[test]
    fn params_wrapper_parses() {
        let req: SignInRequest = serde_json::from_str(
            r#"{"params":{"db":"acme","login":"a@example.com","password":"pw"}}"#,
        )
        .unwrap();
        let cred = req.into_credential();
        assert_eq!(cred.db, "acme");
        assert_eq!(cred.login, "a@example.com");
    }

    #[test]
    fn db_name_is_accepted_as_an_alias() {
        let req: SignInRequest =
            serde_json::from_str(r#"{"db_name":"acme","login":"a","password":"b"}"#).unwrap();
        assert_eq!(req.into_credential().db, "acme");
    }

    #[test]
    fn missing_fields_become_empty_strings() {
        let req: SignInRequest = serde_json::from_str("{}").unwrap();
        let cred = req.into_credential();
        assert!(cred.db.is_empty());
        assert!(cred.login.is_empty());
        assert!(cred.password.is_empty());
    }
}
