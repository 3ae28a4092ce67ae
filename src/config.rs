//! Configuration for the agency admin server

use serde::Deserialize;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Server configuration
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Address to listen on
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Directory holding admin.json and the content documents
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Built site and admin pages, served as static files
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,

    /// Where uploaded images are written (served under /uploads)
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,

    /// HMAC secret for session tokens.
    /// Set via AGENCY_JWT_SECRET / JWT_SECRET, or generated per process.
    #[serde(default)]
    pub jwt_secret: Option<String>,

    /// Mark the session cookie `Secure` (enable behind HTTPS)
    #[serde(default)]
    pub cookie_secure: bool,

    /// Upload size ceiling in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// bcrypt work factor for newly hashed passwords
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,

    /// Log level filter string. Overridden by RUST_LOG.
    /// Default: "agency_admin=info,tower_http=info"
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// Default value functions for serde
fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("./public")
}

fn default_uploads_dir() -> PathBuf {
    PathBuf::from("./public/uploads")
}

fn default_max_upload_bytes() -> usize {
    5 * 1024 * 1024 // 5MB
}

fn default_bcrypt_cost() -> u32 {
    crate::auth::password::DEFAULT_COST
}

fn default_log_level() -> String {
    "agency_admin=info,tower_http=info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            data_dir: default_data_dir(),
            public_dir: default_public_dir(),
            uploads_dir: default_uploads_dir(),
            jwt_secret: None,
            cookie_secure: false,
            max_upload_bytes: default_max_upload_bytes(),
            bcrypt_cost: default_bcrypt_cost(),
            log_level: default_log_level(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("listen_addr", &self.listen_addr)
            .field("data_dir", &self.data_dir)
            .field("public_dir", &self.public_dir)
            .field("uploads_dir", &self.uploads_dir)
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[REDACTED]"))
            .field("cookie_secure", &self.cookie_secure)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Overlay any `AGENCY_*` environment variables onto this config.
    pub fn apply_env(&mut self) {
        if let Ok(addr) = std::env::var("AGENCY_LISTEN_ADDR") {
            if let Ok(parsed) = addr.parse() {
                self.listen_addr = parsed;
            }
        }
        if let Ok(dir) = std::env::var("AGENCY_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("AGENCY_PUBLIC_DIR") {
            self.public_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("AGENCY_UPLOADS_DIR") {
            self.uploads_dir = PathBuf::from(dir);
        }
        if let Some(secret) = std::env::var("AGENCY_JWT_SECRET")
            .or_else(|_| std::env::var("JWT_SECRET"))
            .ok()
            .filter(|s| !s.is_empty())
        {
            self.jwt_secret = Some(secret);
        }
        if let Ok(v) = std::env::var("AGENCY_COOKIE_SECURE") {
            self.cookie_secure = v == "true" || v == "1";
        }
        if let Ok(size) = std::env::var("AGENCY_MAX_UPLOAD_BYTES") {
            if let Ok(parsed) = size.parse() {
                self.max_upload_bytes = parsed;
            }
        }
        if let Ok(cost) = std::env::var("AGENCY_BCRYPT_COST") {
            if let Ok(parsed) = cost.parse() {
                self.bcrypt_cost = parsed;
            }
        }
        if let Ok(level) = std::env::var("AGENCY_LOG_LEVEL") {
            self.log_level = level;
        }
    }

    /// Load configuration from file if it exists, otherwise from environment
    pub fn load() -> Result<Self, ConfigError> {
        // An explicitly named file must load
        if let Ok(path) = std::env::var("AGENCY_CONFIG") {
            let mut config = Self::from_file(&path)?;
            config.apply_env();
            return Ok(config);
        }

        for path in &["agency_admin.toml", "/etc/agency_admin/config.toml"] {
            if std::path::Path::new(path).exists() {
                let mut config = Self::from_file(path)?;
                config.apply_env();
                return Ok(config);
            }
        }

        Ok(Self::from_env())
    }

    /// Return the token secret, generating a random one if none is configured.
    ///
    /// A generated secret only lives as long as the process, so every restart
    /// invalidates outstanding sessions.
    pub fn ensure_jwt_secret(&mut self) -> String {
        if let Some(ref secret) = self.jwt_secret {
            return secret.clone();
        }

        use rand::RngCore;
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        let secret = hex::encode(bytes);

        tracing::warn!(
            "No session secret configured (AGENCY_JWT_SECRET); generated a random one. \
             Admin sessions will not survive a restart."
        );
        self.jwt_secret = Some(secret.clone());
        secret
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.listen_addr.port(), 3000);
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.bcrypt_cost, 12);
        assert!(config.jwt_secret.is_none());
        assert!(!config.cookie_secure);
    }

    #[test]
    fn test_config_parse() {
        let toml = r#"
            listen_addr = "127.0.0.1:8080"
            data_dir = "/var/lib/agency/data"
            jwt_secret = "s3cret"
            cookie_secure = true
        "#;

        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.listen_addr.port(), 8080);
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/agency/data"));
        assert_eq!(config.jwt_secret.as_deref(), Some("s3cret"));
        assert!(config.cookie_secure);
        // Unset fields fall back to defaults
        assert_eq!(config.uploads_dir, PathBuf::from("./public/uploads"));
        assert_eq!(config.log_level, "agency_admin=info,tower_http=info");
    }

    #[test]
    fn test_config_parse_error() {
        assert!(matches!(
            Config::from_toml("listen_addr = 42"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = Config {
            jwt_secret: Some("very-secret-value".into()),
            ..Config::default()
        };
        let printed = format!("{:?}", config);
        assert!(printed.contains("[REDACTED]"));
        assert!(!printed.contains("very-secret-value"));
    }

    #[test]
    fn test_ensure_jwt_secret() {
        let mut config = Config {
            jwt_secret: Some("configured".into()),
            ..Config::default()
        };
        assert_eq!(config.ensure_jwt_secret(), "configured");

        let mut config = Config::default();
        let generated = config.ensure_jwt_secret();
        assert_eq!(generated.len(), 64);
        // Stable for the rest of the process
        assert_eq!(config.ensure_jwt_secret(), generated);
    }
}
