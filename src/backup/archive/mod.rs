pub mod zip_archiver;

use crate::backup::result_error::result::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use zip_archiver::ZipArchiver;

/// How hard the archiver should try to shrink the archive
///
/// - `Optimal`: smallest archive, slowest (default)
/// - `Fastest`: light compression
/// - `NoCompression`: entries are stored as is
#[derive(Clone, Copy, Default, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum CompressionLevel {
    #[default]
    Optimal,
    Fastest,
    NoCompression,
}

/// Packs a source directory into a single archive file.
pub trait Archiver {
    /// Archives the contents of `source_dir` (not the directory itself) into
    /// `archive_path`. The archive must not exist yet.
    fn compress(&self, source_dir: &Path, archive_path: &Path, level: CompressionLevel)
        -> Result<()>;
}
