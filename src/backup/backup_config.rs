use crate::backup::archive::CompressionLevel;
use crate::backup::function_path;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::WithDebugObjectAndFnName;
use crate::backup::validate::{validate_job_name, validate_log_folder_name, validate_not_blank};
use bon::Builder;
use function_name::named;
use getset::Getters;
use itertools::Itertools;
use lettre::message::Mailbox;
use serde::{Deserialize, Serialize};
use serde_with::formats::PreferOne;
use serde_with::{serde_as, OneOrMany};
use std::ffi::OsStr;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;
use validator::{Validate, ValidationError};

/// Whole configuration of one run: where logs go, what to back up and who
/// gets the report.
#[derive(Clone, Debug, Serialize, Deserialize, Validate, Builder, Getters)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
#[getset(get = "pub")]
pub struct RunConfig {
    /// Sub folder created under every job's backup folder
    #[validate(custom(function = validate_log_folder_name))]
    #[builder(into)]
    log_folder_name: String,
    #[validate(custom(function = validate_jobs))]
    #[builder(into)]
    jobs: Vec<BackupJobConfig>,
    #[validate(nested)]
    email: EmailConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate, Builder, Getters, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
#[getset(get = "pub")]
pub struct BackupJobConfig {
    #[validate(custom(function = validate_job_name))]
    #[builder(into)]
    name: String,
    #[builder(into)]
    source_folder: PathBuf,
    #[builder(into)]
    backup_folder: PathBuf,
    #[serde(default)]
    #[builder(default)]
    compression_level: CompressionLevel,
}

#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize, Validate, Builder, Getters)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
#[getset(get = "pub")]
pub struct EmailConfig {
    #[builder(into)]
    from: Mailbox,
    #[serde_as(as = "OneOrMany<_, PreferOne>")]
    #[validate(length(min = 1))]
    #[builder(into)]
    to: Vec<Mailbox>,
    #[validate(custom(function = validate_not_blank))]
    #[builder(into)]
    smtp_server: String,
    #[validate(range(min = 1))]
    smtp_port: u16,
    #[serde(default)]
    #[builder(default)]
    use_ssl: bool,
    /// Stored credential, never the secret itself
    #[builder(into)]
    credential_file: PathBuf,
}

fn validate_jobs(jobs: &[BackupJobConfig]) -> std::result::Result<(), ValidationError> {
    if jobs.is_empty() {
        return Err(ValidationError::new("NoJobs")
            .with_message("at least one backup job is required".into()));
    }

    if let Some(name) = jobs.iter().map(|j| j.name.as_str()).duplicates().next() {
        return Err(ValidationError::new("DuplicateJobName")
            .with_message(format!("job name {name:?} is used more than once").into()));
    }

    for job in jobs {
        job.validate().map_err(|e| {
            ValidationError::new("InvalidJob")
                .with_message(format!("job {:?}: {}", job.name, e).into())
        })?;
    }

    Ok(())
}

/// On-disk format of a configuration file, picked from its extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(OsStr::to_str) {
            Some(ext) if ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml") => {
                ConfigFormat::Yaml
            }
            _ => ConfigFormat::Json,
        }
    }
}

impl RunConfig {
    /// Reads and validates the configuration file. Every failure is reported
    /// as [`Error::ConfigInvalid`] so callers can abort before any job runs.
    #[named]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading configuration from {:?}", path);
        let file = File::open(path).map_err(|e| {
            Error::config_invalid(format!("cannot open config file {:?}: {}", path, e))
        })?;

        Self::from_reader(BufReader::new(file), ConfigFormat::from_path(path))
            .with_debug_object_and_fn_name(path.to_path_buf(), function_path!())
    }

    pub fn from_reader<R: std::io::Read>(reader: R, format: ConfigFormat) -> Result<Self> {
        let config: RunConfig = match format {
            ConfigFormat::Json => serde_json::from_reader(reader)
                .map_err(|e| Error::config_invalid(format!("malformed JSON config: {e}")))?,
            ConfigFormat::Yaml => serde_yml::from_reader(reader)
                .map_err(|e| Error::config_invalid(format!("malformed YAML config: {e}")))?,
        };

        config
            .validate()
            .map_err(|e| Error::config_invalid(e.to_string()))?;
        Ok(config)
    }
}
