use crate::backup::archive::{Archiver, CompressionLevel};
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::WithMsg;
use std::fs::File;
use std::io;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Deflate level used for [`CompressionLevel::Optimal`]
static OPTIMAL_DEFLATE_LEVEL: i64 = 9;
/// Deflate level used for [`CompressionLevel::Fastest`]
static FASTEST_DEFLATE_LEVEL: i64 = 1;

/// Writes zip archives with deflate compression.
///
/// The archive is first written to a hidden temporary file next to the
/// destination and only moved to `archive_path` once the zip directory has
/// been written, so a failed run never leaves a truncated archive behind.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZipArchiver;

impl ZipArchiver {
    fn file_options(level: CompressionLevel) -> SimpleFileOptions {
        let options = SimpleFileOptions::default().large_file(true);
        match level {
            CompressionLevel::Optimal => options
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(OPTIMAL_DEFLATE_LEVEL)),
            CompressionLevel::Fastest => options
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(FASTEST_DEFLATE_LEVEL)),
            CompressionLevel::NoCompression => {
                options.compression_method(CompressionMethod::Stored)
            }
        }
    }
}

/// Zip entry names always use `/`, whatever the platform separator is.
fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Paths the walk must not enter: the archive, its temp file and the whole
/// output folder when that folder sits below the source folder.
struct ArchiveOutput {
    /// Output folder, only when it is strictly below the source folder
    out_dir: Option<PathBuf>,
    files: [PathBuf; 2],
}

impl ArchiveOutput {
    fn new(
        source_root: &Path,
        out_dir: &Path,
        archive_path: &Path,
        temp_path: &Path,
    ) -> Result<Self> {
        let out_root = out_dir.canonicalize()?;
        let in_out_root = |p: &Path| out_root.join(p.file_name().unwrap_or_default());
        let files = [in_out_root(archive_path), in_out_root(temp_path)];
        let out_dir = (out_root != source_root && out_root.starts_with(source_root))
            .then_some(out_root);
        Ok(Self { out_dir, files })
    }

    fn contains(&self, path: &Path) -> bool {
        self.out_dir.as_deref() == Some(path) || self.files.iter().any(|f| f == path)
    }
}

impl Archiver for ZipArchiver {
    fn compress(
        &self,
        source_dir: &Path,
        archive_path: &Path,
        level: CompressionLevel,
    ) -> Result<()> {
        if !source_dir.is_dir() {
            return Err(Error::from(io::Error::other(format!(
                "{:?} is not a directory",
                source_dir
            ))));
        }

        let out_dir = archive_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let temp_file = tempfile::Builder::new()
            .prefix(".")
            .suffix(".zip.tmp")
            .tempfile_in(out_dir)?;

        let source_root = source_dir.canonicalize()?;
        let excluded =
            ArchiveOutput::new(&source_root, out_dir, archive_path, temp_file.path())?;

        let mut writer = ZipWriter::new(temp_file);
        let options = Self::file_options(level);
        tracing::debug!("Creating zip archive with {:?}", level);

        let mut entry_count = 0;
        for entry in WalkDir::new(&source_root)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !excluded.contains(e.path()))
        {
            let entry = entry?;
            let path = entry.path();
            let relative = path.strip_prefix(&source_root).map_err(|e| {
                Error::from(io::Error::other(e))
                    .with_msg(format!("Stripping {:?} from {:?} failed", source_root, path))
            })?;
            let name = entry_name(relative);

            if entry.file_type().is_dir() {
                writer.add_directory(name, options)?;
            } else if entry.file_type().is_file() {
                tracing::trace!("Including file: {:?} -> {:?}", path, name);
                writer.start_file(name, options)?;
                File::open(path)
                    .and_then(|mut f| io::copy(&mut f, &mut writer))
                    .map_err(Error::from)
                    .with_msg(format!("Adding {:?} to archive failed", path))?;
            } else {
                tracing::trace!("Skipping {:?} not a file", path);
                continue;
            }
            entry_count += 1;
        }

        let temp_file = writer.finish()?;
        temp_file
            .persist(archive_path)
            .map_err(|e| Error::from(e.error))
            .with_msg(format!("Moving archive into place at {:?} failed", archive_path))?;

        tracing::info!("Archived {} entries into {:?}", entry_count, archive_path);
        Ok(())
    }
}
