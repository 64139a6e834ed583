//! Signed, time-limited tokens (HS256 JWT).
//!
//! The payload is flattened into the claims next to `iat` and `exp`, so
//! any serde type can be signed and recovered.

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, get_current_timestamp, Algorithm, DecodingKey, EncodingKey,
    Header, Validation,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::config::AuthConfig;

/// Used only outside production when no secret is configured.
const DEVELOPMENT_SECRET: &str = "development-only-insecure-secret";

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("no token signing secret configured")]
    MissingSecret,

    #[error("token has expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("failed to sign token: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims<P> {
    #[serde(flatten)]
    payload: P,
    iat: u64,
    exp: u64,
}

/// Issues and checks tokens with one shared secret.
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: u64,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner").field("ttl_secs", &self.ttl_secs).finish_non_exhaustive()
    }
}

impl TokenSigner {
    pub fn new(secret: &[u8], ttl_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl_secs,
        }
    }

    /// Build from config. Production refuses to run without a secret.
    pub fn from_config(config: &AuthConfig) -> Result<Self, TokenError> {
        match config.secret.as_deref().filter(|s| !s.is_empty()) {
            Some(secret) => Ok(Self::new(secret.as_bytes(), config.token_ttl_secs)),
            None if config.environment.is_production() => Err(TokenError::MissingSecret),
            None => {
                tracing::warn!("No JWT secret configured, using the development secret");
                Ok(Self::new(DEVELOPMENT_SECRET.as_bytes(), config.token_ttl_secs))
            }
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Sign `payload`, valid for the configured lifetime from now.
    pub fn sign<P: Serialize>(&self, payload: &P) -> Result<String, TokenError> {
        let iat = get_current_timestamp();
        let claims = Claims {
            payload,
            iat,
            exp: iat + self.ttl_secs,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(TokenError::Sign)
    }

    /// Check signature and expiry and return the payload.
    pub fn verify<P: DeserializeOwned>(&self, token: &str) -> Result<P, TokenError> {
        decode::<Claims<P>>(token, &self.decoding, &self.validation)
            .map(|data| data.claims.payload)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Session {
        username: String,
        role: String,
    }

    fn session() -> Session {
        Session {
            username: "chef".into(),
            role: "admin".into(),
        }
    }

    #[test]
    fn test_sign_then_verify() {
        let signer = TokenSigner::new(b"secret", 86_400);
        let token = signer.sign(&session()).unwrap();
        assert_eq!(token.split('.').count(), 3);
        assert_eq!(signer.verify::<Session>(&token).unwrap(), session());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = TokenSigner::new(b"secret", 60).sign(&session()).unwrap();
        let err = TokenSigner::new(b"other", 60).verify::<Session>(&token).unwrap_err();
        assert!(matches!(err, TokenError::Invalid(_)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = get_current_timestamp();
        let claims = Claims {
            payload: session(),
            iat: now - 7_200,
            exp: now - 3_600,
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"secret")).unwrap();

        let err = TokenSigner::new(b"secret", 60).verify::<Session>(&token).unwrap_err();
        assert!(matches!(err, TokenError::Expired));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let signer = TokenSigner::new(b"secret", 60);
        let token = signer.sign(&session()).unwrap();
        let other = TokenSigner::new(b"another-secret", 60)
            .sign(&Session {
                username: "mallory".into(),
                role: "admin".into(),
            })
            .unwrap();

        // Claims from one token, signature from the other.
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = other.split('.').nth(1).unwrap();
        let spliced = parts.join(".");

        assert!(matches!(signer.verify::<Session>(&spliced), Err(TokenError::Invalid(_))));
        assert!(matches!(signer.verify::<Session>("garbage"), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_one_day_default_lifetime() {
        let signer = TokenSigner::from_config(&AuthConfig {
            secret: Some("s".into()),
            ..AuthConfig::default()
        })
        .unwrap();
        assert_eq!(signer.ttl_secs(), 86_400);
    }

    #[test]
    fn test_production_requires_secret() {
        let config = AuthConfig {
            environment: Environment::Production,
            secret: None,
            ..AuthConfig::default()
        };
        assert!(matches!(TokenSigner::from_config(&config), Err(TokenError::MissingSecret)));

        let dev = AuthConfig::default();
        let signer = TokenSigner::from_config(&dev).unwrap();
        let token = signer.sign(&session()).unwrap();
        assert_eq!(signer.verify::<Session>(&token).unwrap(), session());
    }
}
