//! Stored SMTP credentials.
//!
//! The configuration only points at a credential file; the secret itself is
//! loaded right before the report is sent.

use crate::backup::redacted::RedactedString;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use bon::Builder;
use getset::Getters;
use lettre::transport::smtp::authentication::Credentials;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use validator::Validate;

#[derive(Clone, Debug, Serialize, Deserialize, Validate, Builder, Getters)]
#[serde(deny_unknown_fields)]
#[getset(get = "pub")]
pub struct Credential {
    #[validate(length(min = 1))]
    #[builder(into)]
    username: String,
    #[validate(nested)]
    #[builder(into)]
    password: RedactedString,
}

impl From<&Credential> for Credentials {
    fn from(value: &Credential) -> Self {
        Credentials::new(value.username.clone(), value.password.inner().to_string())
    }
}

pub trait CredentialStore {
    fn load_credential(&self, path: &Path) -> Result<Credential>;
}

/// Reads a JSON credential file: `{"username": "...", "password": "..."}`.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileCredentialStore;

impl CredentialStore for FileCredentialStore {
    fn load_credential(&self, path: &Path) -> Result<Credential> {
        let not_found = |reason: String| Error::CredentialNotFound {
            path: path.to_path_buf(),
            reason,
        };

        let file = File::open(path).map_err(|e| not_found(e.to_string()))?;
        let credential: Credential = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| not_found(format!("unreadable credential: {e}")))?;
        credential
            .validate()
            .map_err(|e| not_found(format!("invalid credential: {e}")))?;

        tracing::debug!("Loaded credential for {:?} from {:?}", credential.username, path);
        Ok(credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_credential() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mail.cred");
        std::fs::write(&path, r#"{"username": "backup", "password": "hunter2"}"#).unwrap();

        let credential = FileCredentialStore.load_credential(&path).unwrap();
        assert_eq!(credential.username(), "backup");
        assert_eq!(credential.password().inner(), "hunter2");
    }

    #[test]
    fn test_load_missing_credential() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.cred");

        let err = FileCredentialStore.load_credential(&path).unwrap_err();
        assert!(matches!(err, Error::CredentialNotFound { .. }));
    }

    #[test]
    fn test_load_malformed_credential() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.cred");
        std::fs::write(&path, "not json").unwrap();

        let err = FileCredentialStore.load_credential(&path).unwrap_err();
        assert!(matches!(err, Error::CredentialNotFound { .. }));
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential::builder()
            .username("backup")
            .password(RedactedString::builder().inner("hunter2").build())
            .build();

        assert!(!format!("{:?}", credential).contains("hunter2"));
    }
}
