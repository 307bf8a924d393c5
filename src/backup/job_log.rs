//! Per-job log files.
//!
//! Every job appends timestamped lines to its own log file. Writing these
//! lines is best effort: a failing log write never fails a job.

use chrono::Local;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;

static LOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub trait JobLog {
    fn append(&self, path: &Path, line: &str) -> io::Result<()>;
}

impl<L: JobLog + ?Sized> JobLog for &L {
    fn append(&self, path: &Path, line: &str) -> io::Result<()> {
        (**self).append(path, line)
    }
}

/// Appends to the file on disk, opening and closing it for every line.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileJobLog;

impl JobLog for FileJobLog {
    fn append(&self, path: &Path, line: &str) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{line}")
    }
}

/// Prefixes `msg` with the local wall clock time.
pub fn timestamped(msg: &str) -> String {
    format!("{} {}", Local::now().format(LOG_TIME_FORMAT), msg)
}

/// Writes a timestamped line and discards any failure.
pub fn append_best_effort<L: JobLog>(log: &L, path: &Path, msg: &str) {
    if let Err(e) = log.append(path, &timestamped(msg)) {
        tracing::debug!("Ignoring failed write to log file {:?}: {}", path, e);
    }
}
