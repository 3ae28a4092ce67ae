//! Admin authentication: password hashing, session tokens, and the login flow.

mod authenticator;
mod error;
pub mod password;
pub mod token;

pub use authenticator::{Authenticator, LoginSuccess, ProfileUpdate};
pub use error::{AuthError, TokenRejection};
pub use password::PasswordHasher;
pub use token::{SessionClaims, TokenIssuer, TokenVerifier, SESSION_LIFETIME_SECS};
