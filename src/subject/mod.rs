pub mod init;
mod schema;
pub mod validation;

pub use schema::{roll_number, CourseOutcome, DirectAssessment, IndirectAssessment, Subject};
pub use validation::validate_subject;

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the config directory path (~/.config/attainboard/)
pub fn get_config_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Could not determine home directory");
    home.join(".config").join("attainboard")
}

/// Get the default subject file path (~/.config/attainboard/subject.yaml)
pub fn get_subject_path() -> PathBuf {
    get_config_dir().join("subject.yaml")
}

/// Ensure the config directory exists
pub fn ensure_config_dir() -> Result<()> {
    let config_dir = get_config_dir();
    if !config_dir.exists() {
        fs::create_dir_all(&config_dir).with_context(|| {
            format!(
                "Failed to create config directory at {}",
                config_dir.display()
            )
        })?;
    }
    Ok(())
}

/// Load a subject definition from a YAML file.
///
/// # Arguments
///
/// * `path` - Optional path to the subject file. If None, uses the default
///   path (~/.config/attainboard/subject.yaml)
///
/// # Errors
///
/// Returns an error if the file does not exist, cannot be read, or is not
/// valid YAML. Semantic validation is a separate step; see
/// [`validation::validate_subject`].
pub fn load_subject(path: Option<PathBuf>) -> Result<Subject> {
    let subject_path = path.unwrap_or_else(get_subject_path);

    if !subject_path.exists() {
        anyhow::bail!(
            "Subject file not found at {}. Run `attainboard init` to create one.",
            subject_path.display()
        );
    }

    let content = fs::read_to_string(&subject_path)
        .with_context(|| format!("Failed to read subject file at {}", subject_path.display()))?;

    let subject: Subject = serde_saphyr::from_str(&content).with_context(|| {
        format!(
            "Failed to parse subject: invalid YAML in {}",
            subject_path.display()
        )
    })?;

    Ok(subject)
}
