//! Shared test infrastructure for integration tests
//!
//! Provides TestServer, which spawns the real binary against a temporary
//! data directory seeded with an admin record.

#![allow(dead_code)]

use agency_admin::auth::password::MIN_COST;
use agency_admin::auth::PasswordHasher;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::sleep;

/// Port counter to avoid conflicts between tests.
static PORT_COUNTER: AtomicU16 = AtomicU16::new(19300);

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "Deneme!75";
pub const ADMIN_EMAIL: &str = "admin@viendigital.com";

/// Options for the seeded admin record.
pub struct AdminSeed {
    pub is_active: bool,
}

impl Default for AdminSeed {
    fn default() -> Self {
        Self { is_active: true }
    }
}

/// Test server wrapper that spawns a real agency_admin binary
pub struct TestServer {
    process: Child,
    port: u16,
    root: TempDir,
}

impl TestServer {
    /// Start a server with an active admin (`admin` / `Deneme!75`).
    pub async fn start() -> Self {
        Self::start_with(AdminSeed::default()).await
    }

    /// Start a server with no admin record at all.
    pub async fn without_admin() -> Self {
        Self::spawn(None).await
    }

    pub async fn start_with(seed: AdminSeed) -> Self {
        Self::spawn(Some(seed)).await
    }

    /// Allocate a port, write the data files and TOML config, spawn the
    /// binary and wait for readiness.
    async fn spawn(seed: Option<AdminSeed>) -> Self {
        let port = PORT_COUNTER.fetch_add(1, Ordering::SeqCst);
        let root = TempDir::new().expect("Failed to create temp dir");
        let data_dir = root.path().join("data");
        let public_dir = root.path().join("public");
        std::fs::create_dir_all(&data_dir).expect("Failed to create data dir");
        std::fs::create_dir_all(public_dir.join("admin/login")).expect("Failed to create public dir");
        std::fs::write(public_dir.join("index.html"), "<h1>Vien Digital</h1>").unwrap();
        std::fs::write(public_dir.join("admin/login/index.html"), "<h1>Giriş</h1>").unwrap();

        if let Some(seed) = seed {
            write_admin_record(&data_dir, &seed);
        }

        let config = format!(
            "listen_addr = \"127.0.0.1:{port}\"\n\
             data_dir = \"{}\"\n\
             public_dir = \"{}\"\n\
             uploads_dir = \"{}\"\n\
             jwt_secret = \"integration-test-secret\"\n\
             bcrypt_cost = {MIN_COST}\n",
            data_dir.display(),
            public_dir.display(),
            public_dir.join("uploads").display(),
        );
        let config_path = root.path().join("test.toml");
        std::fs::write(&config_path, config).expect("Failed to write test config");

        let process = Command::new(env!("CARGO_BIN_EXE_agency_admin"))
            .env("AGENCY_CONFIG", &config_path)
            .env("RUST_LOG", "agency_admin=warn")
            .env_remove("AGENCY_JWT_SECRET")
            .env_remove("JWT_SECRET")
            .spawn()
            .expect("Failed to start server");

        let mut server = Self {
            process,
            port,
            root,
        };
        server.wait_ready().await;
        server
    }

    async fn wait_ready(&mut self) {
        let addr = format!("127.0.0.1:{}", self.port);
        for _ in 0..150 {
            if std::net::TcpStream::connect(&addr).is_ok() {
                sleep(Duration::from_millis(100)).await;
                return;
            }

            if let Ok(Some(status)) = self.process.try_wait() {
                panic!("Server exited before becoming ready: {}", status);
            }

            sleep(Duration::from_millis(100)).await;
        }

        let _ = self.process.kill();
        panic!("Timed out waiting for server on {}", addr);
    }

    /// Get the HTTP endpoint URL
    pub fn endpoint(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint(), path)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.path().join("data")
    }

    pub fn public_dir(&self) -> PathBuf {
        self.root.path().join("public")
    }

    /// Client with a cookie jar, like a browser session. Redirects are not
    /// followed so the page guard can be observed.
    pub fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to build client")
    }

    /// Client that is already signed in as the seeded admin.
    pub async fn admin_client(&self) -> reqwest::Client {
        let client = self.client();
        let response = self.login(&client, ADMIN_USERNAME, ADMIN_PASSWORD).await;
        assert_eq!(response.status(), 200, "seeded admin login failed");
        client
    }

    pub async fn login(
        &self,
        client: &reqwest::Client,
        username: &str,
        password: &str,
    ) -> reqwest::Response {
        client
            .post(self.url("/api/admin/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("login request failed")
    }

    /// The admin document as currently stored on disk.
    pub fn admin_json(&self) -> serde_json::Value {
        let raw = std::fs::read_to_string(self.data_dir().join("admin.json"))
            .expect("admin.json missing");
        serde_json::from_str(&raw).expect("admin.json is not JSON")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.process.kill();
    }
}

fn write_admin_record(data_dir: &Path, seed: &AdminSeed) {
    let hash = PasswordHasher::new(MIN_COST)
        .hash(ADMIN_PASSWORD)
        .expect("Failed to hash password");
    let doc = json!({
        "admin": {
            "username": ADMIN_USERNAME,
            "password": hash,
            "email": ADMIN_EMAIL,
            "role": "admin",
            "lastLogin": null,
            "createdAt": "2024-01-15T10:30:00.000Z",
            "isActive": seed.is_active
        },
        "settings": {
            "maxLoginAttempts": 5,
            "lockoutDuration": 15,
            "sessionTimeout": 3600,
            "requireTwoFactor": false
        }
    });
    std::fs::write(
        data_dir.join("admin.json"),
        serde_json::to_string_pretty(&doc).unwrap(),
    )
    .expect("Failed to write admin.json");
}

/// Extract the `Set-Cookie` header for the session cookie.
pub fn session_set_cookie(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("adminToken="))
        .map(str::to_string)
}
