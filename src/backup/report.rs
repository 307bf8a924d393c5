use crate::backup::runner::{JobOutcome, JobStatus};
use chrono::NaiveDate;
use getset::Getters;
use itertools::Itertools;

static REPORT_DATE_FORMAT: &str = "%Y-%m-%d";

#[cfg(windows)]
static LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
static LINE_ENDING: &str = "\n";

/// Subject and body of the status email.
#[derive(Clone, Debug, PartialEq, Eq, Getters)]
#[getset(get = "pub")]
pub struct Report {
    subject: String,
    body: String,
}

/// Aggregate of all job outcomes of one run, in job order.
#[derive(Clone, Debug, PartialEq, Getters)]
#[getset(get = "pub")]
pub struct RunSummary {
    outcomes: Vec<JobOutcome>,
    ok_count: usize,
    failed_count: usize,
}

impl RunSummary {
    pub fn new(outcomes: Vec<JobOutcome>) -> Self {
        let ok_count = outcomes.iter().filter(|o| o.ok()).count();
        let failed_count = outcomes.len() - ok_count;
        Self {
            outcomes,
            ok_count,
            failed_count,
        }
    }

    pub fn overall_ok(&self) -> bool {
        self.failed_count == 0
    }

    /// `0` when every job succeeded, `1` otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.overall_ok() {
            0
        } else {
            1
        }
    }

    pub fn subject(&self, date: NaiveDate) -> String {
        let date = date.format(REPORT_DATE_FORMAT);
        if self.overall_ok() {
            format!("Backups SUCCESSFUL ({}) - {} jobs", date, self.ok_count)
        } else {
            format!(
                "Backups COMPLETED WITH FAILURES ({}) - OK: {}, Failed: {}!",
                date, self.ok_count, self.failed_count
            )
        }
    }

    pub fn body(&self, date: NaiveDate) -> String {
        let header = [
            format!("Backup summary - {}", date.format(REPORT_DATE_FORMAT)),
            String::new(),
        ];

        header
            .into_iter()
            .chain(self.outcomes.iter().flat_map(outcome_lines))
            .join(LINE_ENDING)
    }

    pub fn report(&self, date: NaiveDate) -> Report {
        Report {
            subject: self.subject(date),
            body: self.body(date),
        }
    }
}

fn outcome_lines(outcome: &JobOutcome) -> [String; 4] {
    let log = format!("   Log: {}", outcome.log_file_path().display());
    match outcome.status() {
        JobStatus::Succeeded {
            archive_path,
            size_mb,
        } => [
            format!("   {} - {:.2} MB", outcome.name(), size_mb),
            format!("   Zip: {}", archive_path.display()),
            log,
            String::new(),
        ],
        JobStatus::Failed { message, .. } => [
            format!("   {}", outcome.name()),
            format!("   Error: {}", message),
            log,
            String::new(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::runner::JobErrorKind;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    fn ok(name: &str) -> JobOutcome {
        JobOutcome::succeeded(
            name,
            format!("/backup/{name}/logs/backup-{name}2024-03-05.log"),
            format!("/backup/{name}/{name}-24-03-05.zip"),
            2.0,
        )
    }

    fn failed(name: &str) -> JobOutcome {
        JobOutcome::failed(
            name,
            format!("/backup/{name}/logs/backup-{name}2024-03-05.log"),
            None,
            JobErrorKind::SourceMissing,
            format!("Source folder does not exist: /data/{name}"),
        )
    }

    #[test]
    fn test_all_ok_subject() {
        let summary = RunSummary::new(vec![ok("db"), ok("docs")]);

        assert!(summary.overall_ok());
        assert_eq!(summary.exit_code(), 0);
        assert_eq!(
            summary.subject(date()),
            "Backups SUCCESSFUL (2024-03-05) - 2 jobs"
        );
    }

    #[test]
    fn test_single_failure_flips_overall() {
        let summary = RunSummary::new(vec![ok("a"), ok("b"), failed("c"), ok("d")]);

        assert!(!summary.overall_ok());
        assert_eq!(summary.exit_code(), 1);
        assert_eq!(*summary.ok_count(), 3);
        assert_eq!(*summary.failed_count(), 1);
        assert_eq!(
            summary.subject(date()),
            "Backups COMPLETED WITH FAILURES (2024-03-05) - OK: 3, Failed: 1!"
        );
    }

    #[test]
    fn test_body_lines() {
        let summary = RunSummary::new(vec![ok("db"), failed("docs")]);
        let body = summary.body(date());

        assert_eq!(
            body.lines().collect::<Vec<_>>(),
            vec![
                "Backup summary - 2024-03-05",
                "",
                "   db - 2.00 MB",
                "   Zip: /backup/db/db-24-03-05.zip",
                "   Log: /backup/db/logs/backup-db2024-03-05.log",
                "",
                "   docs",
                "   Error: Source folder does not exist: /data/docs",
                "   Log: /backup/docs/logs/backup-docs2024-03-05.log",
            ]
        );
    }

    #[test]
    fn test_report_is_deterministic() {
        let summary = RunSummary::new(vec![ok("db"), failed("docs")]);
        assert_eq!(summary.report(date()), summary.report(date()));
        assert_eq!(summary.report(date()).subject(), &summary.subject(date()));
    }
}
