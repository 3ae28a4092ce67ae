//! Authentication error taxonomy

use crate::store::StorageError;
use std::fmt;
use thiserror::Error;

/// Why a session token was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    /// Signature valid but `exp` is in the past.
    Expired,
    /// Signature does not match the payload under the server secret.
    BadSignature,
    /// Not a decodable token, wrong algorithm, or missing claims.
    Malformed,
}

impl fmt::Display for TokenRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenRejection::Expired => "expired",
            TokenRejection::BadSignature => "bad signature",
            TokenRejection::Malformed => "malformed",
        })
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown username, inactive account, or wrong password. Deliberately
    /// carries no detail so callers cannot tell the causes apart.
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("invalid session token: {0}")]
    InvalidToken(TokenRejection),

    #[error("credential storage failure: {0}")]
    Storage(#[from] StorageError),

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("token signing failed: {0}")]
    Signing(String),
}
