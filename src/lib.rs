//! # notes-backup
//!
//! Configuration driven backups of folders into dated zip archives, meant to be
//! started once per run by an external scheduler.
//!
//! ## Features
//!
//! - **Dated Archives**: one `{name}-{yy}-{MM}-{dd}.zip` per job and day, a rerun
//!   on the same day overwrites it
//! - **Job Isolation**: a failing job is recorded and the run moves on
//! - **Per-job Log Files**: timestamped lines in `backup-{name}{YYYY-MM-DD}.log`
//! - **Email Summary**: one SMTP report for the whole run
//!
//! ## Quick Start
//!
//! ```no_run
//! use notes_backup::backup::archive::ZipArchiver;
//! use notes_backup::backup::backup_config::RunConfig;
//! use notes_backup::backup::credential::FileCredentialStore;
//! use notes_backup::backup::job_log::FileJobLog;
//! use notes_backup::backup::notifications::SmtpNotification;
//! use notes_backup::backup::run::run_backups;
//! use notes_backup::backup::runner::JobRunner;
//!
//! let config = RunConfig::load("backup-config.json")?;
//! let runner = JobRunner::new(ZipArchiver, FileJobLog);
//! let notifier = SmtpNotification::new(config.email().clone(), FileCredentialStore);
//! let result = run_backups(&config, &runner, &notifier, chrono::Local::now().date_naive());
//! std::process::exit(result.exit_code());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod backup;
