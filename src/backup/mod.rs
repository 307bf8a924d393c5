pub mod archive;
pub mod backup_config;
pub mod credential;
pub mod job_log;
pub mod notifications;
pub mod redacted;
pub mod report;
pub mod result_error;
pub mod run;
pub mod runner;
pub mod validate;

macro_rules! function_path {
    () => {
        concat!(module_path!(), "::", function_name!(), " ", file!(), ":", line!())
    };
}

pub(crate) use function_path;
