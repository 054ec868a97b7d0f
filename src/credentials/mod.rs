use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::Write;
use std::path::PathBuf;

use crate::subject::{ensure_config_dir, get_config_dir};

/// Environment variable for providing a Gemini API key without a key file
pub const ENV_KEY_VAR: &str = "ATTAINBOARD_GEMINI_KEY";

const KEY_FILE: &str = "gemini.key";

fn key_file_path() -> PathBuf {
    get_config_dir().join(KEY_FILE)
}

/// Check for an API key in the ATTAINBOARD_GEMINI_KEY environment variable.
/// Returns Some(key) if the env var is set and non-empty, None otherwise.
pub fn get_key_from_env() -> Option<String> {
    match std::env::var(ENV_KEY_VAR) {
        Ok(val) => {
            let trimmed = val.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        }
        Err(_) => None,
    }
}

/// Load the Gemini API key: environment variable first, then the key file.
/// A missing key is not an error; survey analysis falls back to the local
/// summary without one.
pub fn load_api_key() -> Option<String> {
    if let Some(key) = get_key_from_env() {
        return Some(key);
    }
    let key = std::fs::read_to_string(key_file_path()).ok()?;
    let key = key.trim().to_string();
    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}

/// Store the API key in the config directory with owner-only permissions.
pub fn store_api_key(key: &str) -> Result<()> {
    ensure_config_dir()?;
    let path = key_file_path();
    let mut file = AtomicWriteFile::open(&path)
        .with_context(|| format!("Failed to open {} for writing", path.display()))?;
    file.write_all(key.as_bytes())
        .context("Failed to write API key")?;
    file.commit().context("Failed to commit API key file")?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to restrict permissions on {}", path.display()))?;
    }

    Ok(())
}

/// Prompt for a Gemini API key without echoing it, then store it.
pub fn prompt_and_store_key() -> Result<()> {
    println!("Gemini API key required for AI survey analysis.");
    println!("Create one at: https://aistudio.google.com/apikey");
    println!();

    let key = rpassword::prompt_password("Enter API key: ")
        .context("Failed to read API key from stdin")?;
    let key = key.trim();

    if key.is_empty() {
        anyhow::bail!("API key cannot be empty");
    }

    store_api_key(key)?;
    println!("API key stored in {}", key_file_path().display());
    Ok(())
}
