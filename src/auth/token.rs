//! Signed, stateless session tokens (HS256 JWT).
//!
//! A token carries the admin's identity claims plus `iat`/`exp`. Verification
//! needs nothing but the server secret: there is no server-side session
//! table, so logout cannot revoke a token, it can only stop it being sent.

use super::error::{AuthError, TokenRejection};
use crate::store::models::{AdminCredential, Role};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Fixed token lifetime: 24 hours.
pub const SESSION_LIFETIME_SECS: i64 = 24 * 60 * 60;

/// Identity claims embedded in a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<&AdminCredential> for SessionClaims {
    fn from(admin: &AdminCredential) -> Self {
        Self {
            username: admin.username.clone(),
            email: admin.email.clone(),
            role: admin.role,
        }
    }
}

/// Full JWT payload.
#[derive(Debug, Serialize, Deserialize)]
struct TokenPayload {
    #[serde(flatten)]
    claims: SessionClaims,
    /// Issued-at (Unix seconds).
    iat: i64,
    /// Expiration (Unix seconds).
    exp: i64,
}

/// Produces session tokens.
pub struct TokenIssuer {
    key: EncodingKey,
}

impl TokenIssuer {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            key: EncodingKey::from_secret(secret),
        }
    }

    pub fn issue(&self, claims: &SessionClaims) -> Result<String, AuthError> {
        self.issue_at(claims, Utc::now())
    }

    /// Issue a token as if at `issued_at`; it expires `SESSION_LIFETIME_SECS` later.
    pub fn issue_at(
        &self,
        claims: &SessionClaims,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let iat = issued_at.timestamp();
        let payload = TokenPayload {
            claims: claims.clone(),
            iat,
            exp: (issued_at + Duration::seconds(SESSION_LIFETIME_SECS)).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &payload, &self.key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }
}

/// Checks signature and expiry. Pure computation, no I/O.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is compared against the caller's clock in `verify_at`.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat"]);
        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify as if the current time were `now`. Rejected when `now > exp`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, AuthError> {
        let data = jsonwebtoken::decode::<TokenPayload>(token, &self.key, &self.validation)
            .map_err(|e| {
                AuthError::InvalidToken(match e.kind() {
                    ErrorKind::InvalidSignature => TokenRejection::BadSignature,
                    ErrorKind::ExpiredSignature => TokenRejection::Expired,
                    _ => TokenRejection::Malformed,
                })
            })?;

        if now.timestamp() > data.claims.exp {
            return Err(AuthError::InvalidToken(TokenRejection::Expired));
        }
        Ok(data.claims.claims)
    }
}
