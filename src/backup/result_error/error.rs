use crate::backup::result_error::{WithDebugObjectAndFnName, WithMsg};
use std::fmt::Debug;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
    #[error(transparent)]
    Email(#[from] lettre::error::Error),
    #[error(transparent)]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
    #[error("Cannot create folder {}: {}", path.display(), source)]
    FolderCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Source folder does not exist: {}", .0.display())]
    SourceMissing(PathBuf),
    #[error("Compressing {} into {} failed: {}", source_dir.display(), archive.display(), error)]
    CompressionFailed {
        source_dir: PathBuf,
        archive: PathBuf,
        error: Box<Error>,
    },
    #[error("Archive was not created: {}", .0.display())]
    ArchiveNotCreated(PathBuf),
    #[error("Credential not found at {}: {}", path.display(), reason)]
    CredentialNotFound { path: PathBuf, reason: String },
    #[error("Sending mail failed: {0}")]
    MailSendFailed(String),
    #[error("{}:\n{}", msg, indent::indent_all_with("  ", error.to_string()))]
    WithMsg { msg: String, error: Box<Error> },
    #[error("{:?} {} failed:\n{}", obj_debug, fn_name, indent::indent_all_with("  ", error.to_string()))]
    WithDebugObjAndFnName {
        error: Box<Error>,
        obj_debug: Box<dyn Debug + Send>,
        fn_name: String,
    },
}

impl<S: Into<String>, O: Debug + Send + 'static> WithDebugObjectAndFnName<S, O> for Error {
    fn with_debug_object_and_fn_name(self, obj: O, fn_name: S) -> Self {
        Error::WithDebugObjAndFnName {
            error: Box::new(self),
            obj_debug: Box::new(obj),
            fn_name: fn_name.into(),
        }
    }
}

impl<S: Into<String>> WithMsg<S> for Error {
    fn with_msg(self, msg: S) -> Self {
        Self::WithMsg {
            msg: msg.into(),
            error: Box::new(self),
        }
    }
}

impl Error {
    pub fn config_invalid<S: Into<String>>(msg: S) -> Self {
        Error::ConfigInvalid(msg.into())
    }

    /// Error with the context wrappers peeled off.
    pub fn root(&self) -> &Error {
        match self {
            Error::WithMsg { error, .. } => error.root(),
            Error::WithDebugObjAndFnName { error, .. } => error.root(),
            e => e,
        }
    }
}
