//! Signed, time-limited identity tokens (HS256 JWTs).
//!
//! The signing secret is handed in at construction from [`Config`]; nothing in
//! this module reads the environment or carries a built-in key.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header, encode,
};
use serde::{Deserialize, Serialize};

use crate::config::Config;

/// The only algorithm tokens may be signed with.
const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),
    #[error("token is malformed")]
    Malformed,
    #[error("unexpected signing algorithm {0}")]
    UnexpectedAlgorithm(String),
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token is not valid yet")]
    NotYetValid,
}

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    lifetime: Duration,
}

impl TokenService {
    pub fn new(secret: &str, issuer: impl Into<String>, lifetime: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
            lifetime,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.jwt_secret,
            config.jwt_issuer.clone(),
            config.jwt_expiration(),
        )
    }

    pub fn issue_token(&self, user_id: &str) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let lifetime = i64::try_from(self.lifetime.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            sub: user_id.to_string(),
            iss: self.issuer.clone(),
            iat: now,
            exp: now.saturating_add(lifetime),
        };
        self.sign(&claims)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, TokenError> {
        // Check the declared algorithm before touching the signature so a
        // substituted algorithm is reported as such.
        let header = decode_header(token).map_err(|_| match declared_algorithm(token) {
            Some(alg) if alg != "HS256" => TokenError::UnexpectedAlgorithm(alg),
            _ => TokenError::Malformed,
        })?;
        if header.alg != ALGORITHM {
            return Err(TokenError::UnexpectedAlgorithm(format!("{:?}", header.alg)));
        }

        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation())
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidAlgorithm => {
                    TokenError::UnexpectedAlgorithm(format!("{:?}", header.alg))
                }
                ErrorKind::ImmatureSignature => TokenError::NotYetValid,
                _ => TokenError::Malformed,
            })?
            .claims;

        if claims.iat > Utc::now().timestamp() {
            return Err(TokenError::NotYetValid);
        }

        Ok(claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(ALGORITHM), claims, &self.encoding_key).map_err(TokenError::Signing)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iat", "iss", "sub"]);
        validation
    }
}

#[derive(Deserialize)]
struct RawHeader {
    alg: Option<String>,
}

/// Reads `alg` straight from the header segment. Used when the header names
/// an algorithm jsonwebtoken cannot represent, such as `none`.
fn declared_algorithm(token: &str) -> Option<String> {
    let segment = token.split('.').next()?;
    let bytes = URL_SAFE_NO_PAD.decode(segment.trim_end_matches('=')).ok()?;
    serde_json::from_slice::<RawHeader>(&bytes).ok()?.alg
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

    fn service() -> TokenService {
        TokenService::new(SECRET, "freemarket-backend", Duration::from_secs(24 * 3600))
    }

    fn claims_at(iat: i64, exp: i64) -> Claims {
        Claims {
            sub: "alice".to_string(),
            iss: "freemarket-backend".to_string(),
            iat,
            exp,
        }
    }

    #[test]
    fn issued_token_verifies_with_subject() {
        let tokens = service();
        let token = tokens.issue_token("alice").unwrap();

        let claims = tokens.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.iss, "freemarket-backend");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn oversized_lifetime_saturates_instead_of_wrapping() {
        let tokens = TokenService::new(SECRET, "freemarket-backend", Duration::from_secs(u64::MAX));
        let token = tokens.issue_token("alice").unwrap();

        let claims = tokens.verify_token(&token).unwrap();
        assert_eq!(claims.exp, i64::MAX);
    }

    #[test]
    fn expired_token_reports_expiry() {
        let tokens = service();
        let now = Utc::now().timestamp();
        let token = tokens.sign(&claims_at(now - 7200, now - 3600)).unwrap();

        assert!(matches!(tokens.verify_token(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn token_from_the_future_is_rejected() {
        let tokens = service();
        let now = Utc::now().timestamp();
        let token = tokens.sign(&claims_at(now + 3600, now + 7200)).unwrap();

        assert!(matches!(tokens.verify_token(&token), Err(TokenError::NotYetValid)));
    }

    #[test]
    fn other_secret_fails_signature_check() {
        let other = TokenService::new("another-secret", "freemarket-backend", Duration::from_secs(60));
        let token = other.issue_token("alice").unwrap();

        assert!(matches!(
            service().verify_token(&token),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn substituted_algorithm_is_rejected() {
        let now = Utc::now().timestamp();
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims_at(now, now + 60),
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            service().verify_token(&token),
            Err(TokenError::UnexpectedAlgorithm(alg)) if alg == "HS512"
        ));
    }

    #[test]
    fn unsigned_token_is_an_algorithm_substitution() {
        let now = Utc::now().timestamp();
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let claims = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims_at(now, now + 60)).unwrap());
        let token = format!("{header}.{claims}.");

        assert!(matches!(
            service().verify_token(&token),
            Err(TokenError::UnexpectedAlgorithm(alg)) if alg == "none"
        ));
    }

    #[test]
    fn unreadable_header_stays_malformed() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"typ":"JWT"}"#);
        let token = format!("{header}.e30.");

        assert!(matches!(service().verify_token(&token), Err(TokenError::Malformed)));
    }

    #[test]
    fn foreign_issuer_is_rejected() {
        let foreign = TokenService::new(SECRET, "someone-else", Duration::from_secs(60));
        let token = foreign.issue_token("alice").unwrap();

        assert!(matches!(service().verify_token(&token), Err(TokenError::Malformed)));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            service().verify_token("not-a-token"),
            Err(TokenError::Malformed)
        ));
        assert!(matches!(service().verify_token(""), Err(TokenError::Malformed)));
    }
}
