//! Persisted document types.
//!
//! All documents use camelCase keys. Content records keep any keys they do
//! not know about in `extra`, so hand-edited fields survive a rewrite.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Privilege level of the administrative identity. Only one level exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single administrative identity.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCredential {
    pub username: String,
    /// bcrypt hash; the key is `password` on disk.
    #[serde(rename = "password")]
    pub password_hash: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    pub is_active: bool,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for AdminCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredential")
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("email", &self.email)
            .field("role", &self.role)
            .field("is_active", &self.is_active)
            .field("last_login", &self.last_login)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Login policy stored next to the admin record. Only the session lifetime
/// is enforced (and that one is fixed by the token issuer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySettings {
    pub max_login_attempts: u32,
    /// Minutes.
    pub lockout_duration: u32,
    /// Seconds.
    pub session_timeout: u64,
    pub require_two_factor: bool,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            max_login_attempts: 5,
            lockout_duration: 15,
            session_timeout: 3600,
            require_two_factor: false,
        }
    }
}

/// On-disk shape of `admin.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminRecord {
    pub admin: AdminCredential,
    #[serde(default)]
    pub settings: SecuritySettings,
}

/// Partial update merged into the stored [`AdminRecord`]. `None` leaves a
/// field untouched.
#[derive(Clone, Default)]
pub struct AdminUpdate {
    pub password_hash: Option<String>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
    pub last_login: Option<DateTime<Utc>>,
    pub settings: Option<SecuritySettings>,
}

impl AdminUpdate {
    pub fn last_login(at: DateTime<Utc>) -> Self {
        Self {
            last_login: Some(at),
            ..Self::default()
        }
    }

    pub fn password_hash(hash: String) -> Self {
        Self {
            password_hash: Some(hash),
            ..Self::default()
        }
    }

    /// Merge into `record`.
    pub fn apply_to(self, record: &mut AdminRecord) {
        let admin = &mut record.admin;
        if let Some(hash) = self.password_hash {
            admin.password_hash = hash;
        }
        if let Some(email) = self.email {
            admin.email = email;
        }
        if let Some(active) = self.is_active {
            admin.is_active = active;
        }
        if let Some(at) = self.last_login {
            admin.last_login = Some(at);
        }
        if let Some(settings) = self.settings {
            record.settings = settings;
        }
    }
}

impl fmt::Debug for AdminUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminUpdate")
            .field(
                "password_hash",
                &self.password_hash.as_ref().map(|_| "[REDACTED]"),
            )
            .field("email", &self.email)
            .field("is_active", &self.is_active)
            .field("last_login", &self.last_login)
            .field("settings", &self.settings)
            .finish()
    }
}

/// Status value for finished projects, as used by the admin panel.
pub const PROJECT_STATUS_COMPLETED: &str = "Tamamlandı";
/// Status value for clients counted as active.
pub const CLIENT_STATUS_ACTIVE: &str = "Aktif";

pub const MESSAGE_STATUS_NEW: &str = "new";
pub const MESSAGE_STATUS_REPLIED: &str = "replied";

/// Portfolio project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Entered as free text or a number in the admin form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Project {
    /// Numeric value of `budget`, 0 when absent or not a number.
    pub fn budget_value(&self) -> f64 {
        match &self.budget {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => parse_leading_float(s),
            _ => 0.0,
        }
    }
}

/// Parse the leading decimal number of `s` ("15000 TL" -> 15000). Returns 0
/// when `s` does not start with a number.
fn parse_leading_float(s: &str) -> f64 {
    let s = s.trim_start();
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        let ok = c.is_ascii_digit()
            || (c == '.' && !seen_dot)
            || (i == 0 && (c == '-' || c == '+'));
        if !ok {
            break;
        }
        if c == '.' {
            seen_dot = true;
        }
        end = i + c.len_utf8();
    }
    s[..end].parse().unwrap_or(0.0)
}

/// Agency client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_contact: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_projects: u32,
    #[serde(default)]
    pub total_revenue: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Inbound message, from the contact form or entered by the admin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub client_email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replied_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
