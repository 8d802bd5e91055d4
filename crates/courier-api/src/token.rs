use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;
use tracing::warn;

use courier_types::api::Claims;

/// Why a bearer token was rejected. All variants surface as 401.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("token signature does not verify")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token is malformed")]
    Malformed,
    #[error("token has no subject")]
    MissingSubject,
}

/// Names carried alongside the subject for display purposes.
#[derive(Debug, Clone, Default)]
pub struct DisplayClaims {
    pub first_name: String,
    pub last_name: String,
}

/// A freshly signed token and its absolute expiry (seconds since epoch).
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: usize,
}

/// Issues and validates HS256 bearer tokens with a process-wide secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::default();
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    /// Signs a token for `subject_id` that expires after the configured TTL.
    pub fn issue_default(
        &self,
        subject_id: i64,
        display: &DisplayClaims,
    ) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        self.issue(subject_id, display, self.ttl)
    }

    pub fn issue(
        &self,
        subject_id: i64,
        display: &DisplayClaims,
        ttl: Duration,
    ) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        let expires_at = (Utc::now() + ttl).timestamp().max(0) as usize;
        let claims = Claims {
            sub: Some(subject_id.to_string()),
            first_name: display.first_name.clone(),
            last_name: display.last_name.clone(),
            exp: expires_at,
        };

        let token = encode(&Header::default(), &claims, &self.encoding)?;
        Ok(IssuedToken { token, expires_at })
    }

    /// Returns the subject id of a valid token.
    pub fn validate(&self, token: &str) -> Result<i64, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            let reason = match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::MissingRequiredClaim(claim) if claim == "sub" => {
                    AuthError::MissingSubject
                }
                _ => AuthError::Malformed,
            };
            warn!("Rejected bearer token: {}", reason);
            reason
        })?;

        let sub = data.claims.sub.ok_or_else(|| {
            warn!("Rejected bearer token: {}", AuthError::MissingSubject);
            AuthError::MissingSubject
        })?;

        sub.parse::<i64>().map_err(|_| {
            warn!("Rejected bearer token: non-numeric subject '{}'", sub);
            AuthError::Malformed
        })
    }
}
