//! Runs every configured backup job once and records one [`JobOutcome`] per
//! job, in configuration order. A failing job never stops the jobs after it.

use crate::backup::archive::Archiver;
use crate::backup::backup_config::{BackupJobConfig, RunConfig};
use crate::backup::job_log::{append_best_effort, JobLog};
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use chrono::NaiveDate;
use getset::Getters;
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub static STARTING_MESSAGE: &str = "Starting Notes backup...";
static ARCHIVE_DATE_FORMAT: &str = "%y-%m-%d";
static LOG_DATE_FORMAT: &str = "%Y-%m-%d";
static BYTES_PER_MB: f64 = 1_048_576.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobErrorKind {
    FolderCreationFailed,
    SourceMissing,
    CompressionFailed,
    ArchiveNotCreated,
    Io,
}

impl From<&Error> for JobErrorKind {
    fn from(value: &Error) -> Self {
        match value.root() {
            Error::FolderCreationFailed { .. } => JobErrorKind::FolderCreationFailed,
            Error::SourceMissing(_) => JobErrorKind::SourceMissing,
            Error::CompressionFailed { .. } => JobErrorKind::CompressionFailed,
            Error::ArchiveNotCreated(_) => JobErrorKind::ArchiveNotCreated,
            _ => JobErrorKind::Io,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum JobStatus {
    Succeeded {
        archive_path: PathBuf,
        size_mb: f64,
    },
    Failed {
        /// Set as soon as the archive name is known, even if archiving failed later
        archive_path: Option<PathBuf>,
        kind: JobErrorKind,
        message: String,
    },
}

/// Result of attempting one job.
#[derive(Clone, Debug, PartialEq, Getters)]
#[getset(get = "pub")]
pub struct JobOutcome {
    name: String,
    log_file_path: PathBuf,
    status: JobStatus,
}

impl JobOutcome {
    pub fn succeeded<S: Into<String>, P1: Into<PathBuf>, P2: Into<PathBuf>>(
        name: S,
        log_file_path: P1,
        archive_path: P2,
        size_mb: f64,
    ) -> Self {
        Self {
            name: name.into(),
            log_file_path: log_file_path.into(),
            status: JobStatus::Succeeded {
                archive_path: archive_path.into(),
                size_mb,
            },
        }
    }

    pub fn failed<S: Into<String>, P: Into<PathBuf>, M: Into<String>>(
        name: S,
        log_file_path: P,
        archive_path: Option<PathBuf>,
        kind: JobErrorKind,
        message: M,
    ) -> Self {
        Self {
            name: name.into(),
            log_file_path: log_file_path.into(),
            status: JobStatus::Failed {
                archive_path,
                kind,
                message: message.into(),
            },
        }
    }

    pub fn ok(&self) -> bool {
        matches!(self.status, JobStatus::Succeeded { .. })
    }

    pub fn archive_path(&self) -> Option<&Path> {
        match &self.status {
            JobStatus::Succeeded { archive_path, .. } => Some(archive_path),
            JobStatus::Failed { archive_path, .. } => archive_path.as_deref(),
        }
    }

    pub fn size_mb(&self) -> Option<f64> {
        match self.status {
            JobStatus::Succeeded { size_mb, .. } => Some(size_mb),
            JobStatus::Failed { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            JobStatus::Succeeded { .. } => None,
            JobStatus::Failed { message, .. } => Some(message),
        }
    }

    pub fn error_kind(&self) -> Option<JobErrorKind> {
        match self.status {
            JobStatus::Succeeded { .. } => None,
            JobStatus::Failed { kind, .. } => Some(kind),
        }
    }
}

/// `{name}-{yy}-{MM}-{dd}.zip`, one archive per job and calendar day.
pub fn archive_file_name(job_name: &str, date: NaiveDate) -> String {
    format!("{}-{}.zip", job_name, date.format(ARCHIVE_DATE_FORMAT))
}

/// `backup-{name}{YYYY-MM-DD}.log`. There is intentionally no separator
/// between the name and the date, existing log folders use this layout.
pub fn log_file_name(job_name: &str, date: NaiveDate) -> String {
    format!("backup-{}{}.log", job_name, date.format(LOG_DATE_FORMAT))
}

/// Size in MiB rounded to two decimals.
pub fn size_in_mb(bytes: u64) -> f64 {
    (bytes as f64 / BYTES_PER_MB * 100.0).round() / 100.0
}

pub struct JobRunner<A, L> {
    archiver: A,
    log: L,
}

impl<A: Archiver, L: JobLog> JobRunner<A, L> {
    pub fn new(archiver: A, log: L) -> Self {
        Self { archiver, log }
    }

    pub fn run(&self, config: &RunConfig, date: NaiveDate) -> Vec<JobOutcome> {
        config
            .jobs()
            .iter()
            .map(|job| self.run_job(job, config.log_folder_name(), date))
            .collect()
    }

    /// Never returns an error: every failure becomes a failed [`JobOutcome`].
    pub fn run_job(
        &self,
        job: &BackupJobConfig,
        log_folder_name: &str,
        date: NaiveDate,
    ) -> JobOutcome {
        let log_folder = job.backup_folder().join(log_folder_name);
        let log_file_path = log_folder.join(log_file_name(job.name(), date));
        let mut archive_path = None;

        info!("Running backup job {:?}", job.name());
        match self.archive_job(job, &log_folder, &log_file_path, date, &mut archive_path) {
            Ok((archive_path, size_mb)) => {
                JobOutcome::succeeded(job.name(), log_file_path, archive_path, size_mb)
            }
            Err(e) => {
                let message = e.to_string();
                error!("Backup job {:?} failed: {}", job.name(), message);
                append_best_effort(&self.log, &log_file_path, &format!("ERROR: {message}"));
                JobOutcome::failed(
                    job.name(),
                    log_file_path,
                    archive_path,
                    JobErrorKind::from(&e),
                    message,
                )
            }
        }
    }

    fn archive_job(
        &self,
        job: &BackupJobConfig,
        log_folder: &Path,
        log_file_path: &Path,
        date: NaiveDate,
        archive_path_out: &mut Option<PathBuf>,
    ) -> Result<(PathBuf, f64)> {
        for folder in [job.backup_folder().as_path(), log_folder] {
            std::fs::create_dir_all(folder).map_err(|source| Error::FolderCreationFailed {
                path: folder.to_path_buf(),
                source,
            })?;
        }

        self.log_line(log_file_path, STARTING_MESSAGE);

        let source_folder = job.source_folder();
        if !source_folder.exists() {
            return Err(Error::SourceMissing(source_folder.clone()));
        }

        let archive_path = job
            .backup_folder()
            .join(archive_file_name(job.name(), date));
        *archive_path_out = Some(archive_path.clone());

        if archive_path.exists() {
            std::fs::remove_file(&archive_path)?;
            self.log_line(
                log_file_path,
                &format!("Removed existing archive {}", archive_path.display()),
            );
        }

        self.log_line(
            log_file_path,
            &format!(
                "Compressing {} into {}",
                source_folder.display(),
                archive_path.display()
            ),
        );
        self.archiver
            .compress(source_folder, &archive_path, *job.compression_level())
            .map_err(|e| Error::CompressionFailed {
                source_dir: source_folder.clone(),
                archive: archive_path.clone(),
                error: Box::new(e),
            })?;

        if !archive_path.is_file() {
            return Err(Error::ArchiveNotCreated(archive_path));
        }

        let size_mb = size_in_mb(std::fs::metadata(&archive_path)?.len());
        self.log_line(
            log_file_path,
            &format!(
                "Backup completed: {} ({:.2} MB)",
                archive_path.display(),
                size_mb
            ),
        );

        Ok((archive_path, size_mb))
    }

    fn log_line(&self, log_file_path: &Path, msg: &str) {
        info!("{}", msg);
        append_best_effort(&self.log, log_file_path, msg);
    }
}
