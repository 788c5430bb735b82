//! Directory snapshots as in-memory zip blobs.
//!
//! Entries are added in sorted order with a fixed modification time, so
//! snapshotting the same tree twice produces byte-identical blobs and
//! repeated downloads of a stored snapshot compare equal.

use std::fs;
use std::io::{self, Cursor};
use std::path::Path;

use bytes::Bytes;
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

/// Errors from building a directory snapshot.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Snapshot the directory tree rooted at `root` into a zip blob.
///
/// Entry names are relative to `root` with forward slashes. Symlinks and
/// other non-regular files are skipped. An empty directory yields a valid,
/// empty archive.
pub fn snapshot_dir(root: &Path) -> Result<Bytes, ArchiveError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default())
        .unix_permissions(0o644);

    append_dir(&mut zip, root, "", options)?;

    let cursor = zip.finish()?;
    Ok(Bytes::from(cursor.into_inner()))
}

fn append_dir(
    zip: &mut ZipWriter<Cursor<Vec<u8>>>,
    dir: &Path,
    prefix: &str,
    options: SimpleFileOptions,
) -> Result<(), ArchiveError> {
    let mut entries = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let name = entry.file_name().to_string_lossy().into_owned();
        let entry_name = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}/{name}")
        };

        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            zip.add_directory(entry_name.as_str(), options)?;
            append_dir(zip, &entry.path(), &entry_name, options)?;
        } else if file_type.is_file() {
            zip.start_file(entry_name.as_str(), options)?;
            let mut file = fs::File::open(entry.path())?;
            io::copy(&mut file, zip)?;
        }
    }

    Ok(())
}
