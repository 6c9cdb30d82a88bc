use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};

use crate::claims::{TokenClaims, TokenError, validate_claims};

/// Signs and verifies compact HS256 bearer tokens.
///
/// The codec is a pure function of its inputs plus the configured secret:
/// safe to share across arbitrarily many concurrent requests.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenCodec {
    /// Default token lifetime: 90 days.
    pub const DEFAULT_LIFETIME_DAYS: i64 = 90;

    pub fn new(secret: &[u8], lifetime: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the caller's clock in `validate_claims`,
        // not against the process clock at decode time.
        validation.validate_exp = false;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            lifetime,
        }
    }

    pub fn with_default_lifetime(secret: &[u8]) -> Self {
        Self::new(secret, Duration::days(Self::DEFAULT_LIFETIME_DAYS))
    }

    /// Issue a signed token for `uid`, valid from `now` for the configured
    /// lifetime.
    pub fn issue(&self, uid: i64, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = TokenClaims {
            uid,
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| TokenError::Malformed)
    }

    /// Verify signature and time window, returning the subject id.
    ///
    /// An unverified payload is never trusted: signature first, then the
    /// claim window against `now`.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<i64, TokenError> {
        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed,
            })?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims.uid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec(secret: &str) -> TokenCodec {
        TokenCodec::with_default_lifetime(secret.as_bytes())
    }

    #[test]
    fn issue_then_verify_round_trips() {
        let c = codec("test-secret");
        let now = Utc::now();
        let token = c.issue(42, now).unwrap();
        assert_eq!(c.verify(&token, now), Ok(42));
    }

    #[test]
    fn verify_fails_after_the_lifetime_elapses() {
        let c = codec("test-secret");
        let now = Utc::now();
        let token = c.issue(42, now).unwrap();

        let later = now + Duration::days(TokenCodec::DEFAULT_LIFETIME_DAYS) + Duration::seconds(1);
        assert_eq!(c.verify(&token, later), Err(TokenError::Expired));
    }

    #[test]
    fn verify_rejects_a_token_signed_with_a_different_secret() {
        let now = Utc::now();
        let token = codec("secret-a").issue(42, now).unwrap();
        assert_eq!(codec("secret-b").verify(&token, now), Err(TokenError::BadSignature));
    }

    #[test]
    fn verify_rejects_garbage() {
        let c = codec("test-secret");
        assert_eq!(c.verify("not.a.token", Utc::now()), Err(TokenError::Malformed));
        assert_eq!(c.verify("", Utc::now()), Err(TokenError::Malformed));
    }
}
