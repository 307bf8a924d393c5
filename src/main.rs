use chrono::Local;
use clap::Parser;
use notes_backup::backup::archive::ZipArchiver;
use notes_backup::backup::backup_config::RunConfig;
use notes_backup::backup::credential::FileCredentialStore;
use notes_backup::backup::job_log::FileJobLog;
use notes_backup::backup::notifications::SmtpNotification;
use notes_backup::backup::run::run_backups;
use notes_backup::backup::runner::JobRunner;
use std::path::PathBuf;
use std::process::exit;
use tracing::error;

/// Exit code used when the configuration cannot be loaded, before any job runs
static CONFIG_ERROR_EXIT_CODE: i32 = 2;

/// Archive configured folders into dated zip files and mail a summary
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Location of config file
    #[arg(short, long)]
    config: PathBuf,
}

fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let config = match RunConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            exit(CONFIG_ERROR_EXIT_CODE);
        }
    };

    let runner = JobRunner::new(ZipArchiver, FileJobLog);
    let notifier = SmtpNotification::new(config.email().clone(), FileCredentialStore);
    let result = run_backups(&config, &runner, &notifier, Local::now().date_naive());

    exit(result.exit_code());
}
