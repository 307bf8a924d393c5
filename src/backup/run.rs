use crate::backup::archive::Archiver;
use crate::backup::backup_config::RunConfig;
use crate::backup::job_log::JobLog;
use crate::backup::notifications::Notification;
use crate::backup::report::{Report, RunSummary};
use crate::backup::result_error::error::Error;
use crate::backup::runner::JobRunner;
use chrono::NaiveDate;
use getset::Getters;
use tracing::{error, info, warn};

#[derive(Debug, Getters)]
#[getset(get = "pub")]
pub struct RunResult {
    summary: RunSummary,
    report: Report,
    /// Kept apart from the summary, it must never change the exit code
    notification_error: Option<Error>,
}

impl RunResult {
    pub fn exit_code(&self) -> i32 {
        self.summary.exit_code()
    }
}

/// Runs every job, then mails the summary. A failed notification is logged
/// and returned but leaves the job outcomes and exit code untouched.
pub fn run_backups<A: Archiver, L: JobLog, N: Notification>(
    config: &RunConfig,
    runner: &JobRunner<A, L>,
    notifier: &N,
    date: NaiveDate,
) -> RunResult {
    info!("Running {} backup jobs", config.jobs().len());

    let summary = RunSummary::new(runner.run(config, date));
    let report = summary.report(date);
    if summary.overall_ok() {
        info!("{}", report.subject());
    } else {
        warn!("{}", report.subject());
    }

    let notification_error = notifier.send(report.subject(), report.body()).err();
    if let Some(e) = &notification_error {
        error!("Failed to send backup summary email:\n{e}");
    }

    RunResult {
        summary,
        report,
        notification_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::archive::ZipArchiver;
    use crate::backup::backup_config::{BackupJobConfig, EmailConfig};
    use crate::backup::result_error::result::Result;
    use lettre::message::Mailbox;
    use std::cell::RefCell;
    use std::fmt::Display;
    use std::io;
    use std::path::Path;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: RefCell<Vec<(String, String)>>,
    }

    impl Notification for RecordingNotifier {
        fn send<D1: Display, D2: Display>(&self, topic: D1, msg: D2) -> Result<()> {
            self.sent
                .borrow_mut()
                .push((topic.to_string(), msg.to_string()));
            Ok(())
        }
    }

    struct FailingNotifier;

    impl Notification for FailingNotifier {
        fn send<D1: Display, D2: Display>(&self, _topic: D1, _msg: D2) -> Result<()> {
            Err(Error::MailSendFailed("connection refused".to_string()))
        }
    }

    struct NullJobLog;

    impl JobLog for NullJobLog {
        fn append(&self, _path: &Path, _line: &str) -> io::Result<()> {
            Ok(())
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    fn config(jobs: Vec<BackupJobConfig>) -> RunConfig {
        RunConfig::builder()
            .log_folder_name("logs")
            .jobs(jobs)
            .email(
                EmailConfig::builder()
                    .from("backup@example.com".parse::<Mailbox>().unwrap())
                    .to(vec!["admin@example.com".parse::<Mailbox>().unwrap()])
                    .smtp_server("smtp.example.com")
                    .smtp_port(587)
                    .credential_file("/etc/backup/mail.cred")
                    .build(),
            )
            .build()
    }

    fn db_job(root: &Path) -> BackupJobConfig {
        let source = root.join("db");
        std::fs::create_dir_all(&source).unwrap();
        std::fs::write(source.join("data.sql"), "create table notes(id int);").unwrap();
        BackupJobConfig::builder()
            .name("db")
            .source_folder(source)
            .backup_folder(root.join("backup"))
            .build()
    }

    #[test]
    fn test_mixed_run() {
        let root = TempDir::new().unwrap();
        let docs_source = root.path().join("docs");
        let config = config(vec![
            db_job(root.path()),
            BackupJobConfig::builder()
                .name("docs")
                .source_folder(&docs_source)
                .backup_folder(root.path().join("backup"))
                .build(),
        ]);
        let runner = JobRunner::new(ZipArchiver, NullJobLog);
        let notifier = RecordingNotifier::default();

        let result = run_backups(&config, &runner, &notifier, date());

        assert_eq!(result.exit_code(), 1);
        let outcomes = result.summary().outcomes();
        assert!(outcomes[0].ok());
        assert!(outcomes[0].size_mb().is_some());
        assert!(outcomes[0]
            .archive_path()
            .unwrap()
            .to_string_lossy()
            .ends_with("db-24-03-05.zip"));
        assert!(!outcomes[1].ok());
        assert_eq!(
            outcomes[1].error_message().unwrap(),
            format!("Source folder does not exist: {}", docs_source.display())
        );

        let sent = notifier.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].0.contains("COMPLETED WITH FAILURES"));
        assert!(sent[0].0.contains("OK: 1, Failed: 1"));
        assert_eq!(&sent[0].1, result.report().body());
    }

    #[test]
    fn test_notification_failure_keeps_exit_code() {
        let root = TempDir::new().unwrap();
        let config = config(vec![db_job(root.path())]);
        let runner = JobRunner::new(ZipArchiver, NullJobLog);

        let result = run_backups(&config, &runner, &FailingNotifier, date());

        assert_eq!(result.exit_code(), 0);
        assert!(result.summary().overall_ok());
        assert!(matches!(
            result.notification_error(),
            Some(Error::MailSendFailed(_))
        ));
    }

    #[test]
    fn test_notification_failure_does_not_hide_job_failure() {
        let root = TempDir::new().unwrap();
        let config = config(vec![BackupJobConfig::builder()
            .name("docs")
            .source_folder(root.path().join("missing"))
            .backup_folder(root.path().join("backup"))
            .build()]);
        let runner = JobRunner::new(ZipArchiver, NullJobLog);

        let result = run_backups(&config, &runner, &FailingNotifier, date());

        assert_eq!(result.exit_code(), 1);
        assert!(result.notification_error().is_some());
    }
}
