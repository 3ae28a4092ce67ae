//! Interactive `setup-admin` command.
//!
//! Creates the single admin record in `<data_dir>/admin.json`. The prompt
//! logic runs against any `BufRead`/`Write` pair so it can be driven from
//! tests.

use crate::auth::{AuthError, PasswordHasher};
use crate::store::models::{AdminCredential, AdminRecord, Role, SecuritySettings};
use crate::store::{CredentialStore, FileCredentialStore, StorageError};
use chrono::Utc;
use std::io::{self, BufRead, Write};
use std::path::Path;

const DEFAULT_USERNAME: &str = "admin";
const DEFAULT_EMAIL: &str = "admin@viendigital.com";

/// Errors that can occur during admin setup.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Hashing error: {0}")]
    Auth(#[from] AuthError),

    #[error("Cancelled by user")]
    Cancelled,
}

/// Public entry point wiring stdin/stdout and the file-backed store.
pub async fn run_setup_admin(data_dir: &Path, bcrypt_cost: u32) -> Result<(), SetupError> {
    let store = FileCredentialStore::new(data_dir);
    let exists = store.exists().await;
    let location = store.path().display().to_string();
    let hasher = PasswordHasher::new(bcrypt_cost);

    // bcrypt and stdin both block
    let record = tokio::task::spawn_blocking(move || {
        let stdin = io::stdin();
        let mut reader = stdin.lock();
        let mut writer = io::stdout();
        prompt_admin_record(&location, exists, hasher, &mut reader, &mut writer)
    })
    .await
    .map_err(|e| SetupError::Io(io::Error::other(e)))??;

    let Some(record) = record else {
        return Ok(());
    };

    store.create(&record).await?;
    tracing::info!(
        username = %record.admin.username,
        path = %store.path().display(),
        "Admin record written"
    );
    println!("Admin user '{}' created.", record.admin.username);
    Ok(())
}

/// Prompt the user for a string value, returning `default` on empty input.
/// Returns `Err(SetupError::Cancelled)` on EOF.
fn prompt(
    reader: &mut impl BufRead,
    writer: &mut impl Write,
    label: &str,
    default: &str,
) -> Result<String, SetupError> {
    write!(writer, "{} [{}]: ", label, default)?;
    writer.flush()?;
    read_trimmed(reader).map(|line| {
        if line.is_empty() {
            default.to_string()
        } else {
            line
        }
    })
}

fn read_trimmed(reader: &mut impl BufRead) -> Result<String, SetupError> {
    let mut line = String::new();
    let n = reader.read_line(&mut line)?;
    if n == 0 {
        return Err(SetupError::Cancelled);
    }
    Ok(line.trim().to_string())
}

/// Prompt for a yes/no answer. Retries on invalid input.
fn prompt_yes_no(
    reader: &mut impl BufRead,
    writer: &mut impl Write,
    label: &str,
    default: bool,
) -> Result<bool, SetupError> {
    let default_str = if default { "y" } else { "n" };
    loop {
        let answer = prompt(reader, writer, label, default_str)?;
        match answer.to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => {
                writeln!(writer, "  Please answer y or n.")?;
            }
        }
    }
}

/// Prompt for a non-empty password entered twice.
fn prompt_password(reader: &mut impl BufRead, writer: &mut impl Write) -> Result<String, SetupError> {
    loop {
        write!(writer, "Password: ")?;
        writer.flush()?;
        let password = read_trimmed(reader)?;
        if password.is_empty() {
            writeln!(writer, "  Password is required.")?;
            continue;
        }
        write!(writer, "Confirm password: ")?;
        writer.flush()?;
        if read_trimmed(reader)? != password {
            writeln!(writer, "  Passwords do not match, please try again.")?;
            continue;
        }
        return Ok(password);
    }
}

/// Core setup logic. Returns `None` when the user declines to replace an
/// existing record.
pub fn prompt_admin_record(
    location: &str,
    exists: bool,
    hasher: PasswordHasher,
    reader: &mut impl BufRead,
    writer: &mut impl Write,
) -> Result<Option<AdminRecord>, SetupError> {
    writeln!(writer)?;
    writeln!(writer, "Agency Admin - Administrator Setup")?;
    writeln!(writer, "==================================")?;
    writeln!(writer)?;

    if exists {
        let overwrite = prompt_yes_no(
            reader,
            writer,
            &format!("{location} already exists. Replace the admin user?"),
            false,
        )?;
        if !overwrite {
            writeln!(writer, "Cancelled.")?;
            return Ok(None);
        }
        writeln!(writer)?;
    }

    let username = prompt(reader, writer, "Username", DEFAULT_USERNAME)?;
    let password = prompt_password(reader, writer)?;
    let email = prompt(reader, writer, "Email", DEFAULT_EMAIL)?;

    let password_hash = hasher.hash(&password)?;

    writeln!(writer)?;
    writeln!(writer, "Writing {location}")?;

    Ok(Some(AdminRecord {
        admin: AdminCredential {
            username,
            password_hash,
            email,
            role: Role::Admin,
            is_active: true,
            last_login: None,
            created_at: Utc::now(),
        },
        settings: SecuritySettings::default(),
    }))
}
