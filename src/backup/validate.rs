//! Validation functions for configuration values.
//!
//! Provides custom validation functions for job names and folder names
//! used by the `validator` derives on the configuration types.

use sanitize_filename::{is_sanitized, sanitize};
use validator::ValidationError;

use std::path::{Component, Path};

pub fn validate_job_name<S: AsRef<str>>(name: S) -> Result<(), ValidationError> {
    let name = name.as_ref();
    if name.trim().is_empty() {
        return Err(ValidationError::new("InvalidJobName")
            .with_message("Job name must not be empty".into()));
    }

    if !is_sanitized(name) {
        return Err(ValidationError::new("InvalidJobName").with_message(
            format!(
                "Invalid job name {:?}, try sanitizing like {:?}",
                name,
                sanitize(name)
            )
            .into(),
        ));
    }

    Ok(())
}

/// The log folder lives inside every backup folder, so it must be a single
/// plain path component.
pub fn validate_log_folder_name<S: AsRef<str>>(name: S) -> Result<(), ValidationError> {
    let name = name.as_ref();
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(ValidationError::new("InvalidLogFolderName").with_message(
            format!("logFolderName {name:?} must be a single relative folder name").into(),
        )),
    }
}

pub fn validate_not_blank<S: AsRef<str>>(value: S) -> Result<(), ValidationError> {
    if value.as_ref().trim().is_empty() {
        Err(ValidationError::new("Blank").with_message("must not be blank".into()))
    } else {
        Ok(())
    }
}
