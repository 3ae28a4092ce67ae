//! Credential check, session issuance, and account maintenance.

use super::error::{AuthError, TokenRejection};
use super::password::PasswordHasher;
use super::token::{SessionClaims, TokenIssuer, TokenVerifier};
use crate::store::models::{AdminCredential, AdminUpdate};
use crate::store::CredentialStore;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Result of a successful login.
#[derive(Debug)]
pub struct LoginSuccess {
    pub token: String,
    pub claims: SessionClaims,
}

/// Editable profile fields. The password hash is not one of them; use
/// [`Authenticator::change_password`].
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub is_active: Option<bool>,
}

/// Session authenticator for the single admin identity.
pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    issuer: TokenIssuer,
    verifier: TokenVerifier,
}

impl Authenticator {
    pub fn new(store: Arc<dyn CredentialStore>, hasher: PasswordHasher, secret: &[u8]) -> Self {
        Self {
            store,
            hasher,
            issuer: TokenIssuer::new(secret),
            verifier: TokenVerifier::new(secret),
        }
    }

    pub fn hasher(&self) -> PasswordHasher {
        self.hasher
    }

    /// Check `username`/`password` against the stored record and issue a
    /// session token.
    ///
    /// Unknown username, inactive account and wrong password all yield
    /// [`AuthError::InvalidCredentials`]. The bcrypt comparison runs in every
    /// case so the three are not distinguishable by timing either. On
    /// success `lastLogin` is persisted before the token is returned.
    #[instrument(skip_all)]
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginSuccess, AuthError> {
        let record = self.store.load().await?;
        let admin = &record.admin;

        let password_ok = self
            .hasher
            .verify_blocking(password, &admin.password_hash)
            .await;

        if admin.username != username {
            debug!("login rejected: unknown username");
            return Err(AuthError::InvalidCredentials);
        }
        if !admin.is_active {
            warn!(username = %admin.username, "login rejected: account disabled");
            return Err(AuthError::InvalidCredentials);
        }
        if !password_ok {
            warn!(username = %admin.username, "login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let saved = self.store.save(AdminUpdate::last_login(Utc::now())).await?;
        let claims = SessionClaims::from(&saved.admin);
        let token = self.issuer.issue(&claims)?;

        info!(username = %claims.username, "admin logged in");
        Ok(LoginSuccess { token, claims })
    }

    /// Verify a presented session token.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        self.verifier.verify(token).inspect_err(|e| {
            if let AuthError::InvalidToken(reason) = e {
                if *reason != TokenRejection::Expired {
                    warn!(%reason, "session token rejected");
                }
            }
        })
    }

    /// Replace the password hash after checking `current`.
    #[instrument(skip_all, fields(username = %username))]
    pub async fn change_password(
        &self,
        username: &str,
        current: &str,
        new: &str,
    ) -> Result<(), AuthError> {
        let record = self.store.load().await?;
        let current_ok = self
            .hasher
            .verify_blocking(current, &record.admin.password_hash)
            .await;
        if record.admin.username != username || !current_ok {
            warn!("password change rejected: current password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let hash = self.hasher.hash_blocking(new).await?;
        self.store.save(AdminUpdate::password_hash(hash)).await?;
        info!("admin password changed");
        Ok(())
    }

    /// Update profile fields of the admin record.
    #[instrument(skip_all)]
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<AdminCredential, AuthError> {
        let saved = self
            .store
            .save(AdminUpdate {
                email: update.email,
                is_active: update.is_active,
                ..AdminUpdate::default()
            })
            .await?;
        info!(username = %saved.admin.username, "admin profile updated");
        Ok(saved.admin)
    }
}
