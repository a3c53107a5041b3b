//! Filesystem helpers for segment files: on-demand directories and
//! temp-file-then-rename writes.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Suffix for a segment body that has not been fully written yet.
pub const TEMP_SUFFIX: &str = ".part";

#[derive(Debug, thiserror::Error)]
pub enum FsError {
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to remove {}: {source}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Path for the temp file: appends `.part` (e.g. `seg1.ts` -> `seg1.ts.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

pub fn ensure_dir(dir: &Path) -> Result<(), FsError> {
    fs::create_dir_all(dir).map_err(|source| FsError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// True when `path` is a regular file with at least one byte.
pub fn is_nonempty_file(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

/// Write `data` to `final_path` through `<final_path>.part` and an atomic rename.
///
/// On any failure the temp file is removed, so `final_path` either holds the
/// complete body or is left as it was.
pub fn write_atomic(final_path: &Path, data: &[u8]) -> Result<(), FsError> {
    let tmp = temp_path(final_path);
    let result = write_and_sync(&tmp, data).and_then(|()| fs::rename(&tmp, final_path));
    result.map_err(|source| {
        discard_temp(&tmp);
        FsError::Write {
            path: final_path.to_path_buf(),
            source,
        }
    })
}

fn write_and_sync(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut f = File::options()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    f.write_all(data)?;
    f.sync_all()
}

/// Best-effort removal of a leftover temp file.
pub fn discard_temp(tmp: &Path) {
    match fs::remove_file(tmp) {
        Ok(()) => tracing::debug!(path = %tmp.display(), "removed partial file"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %tmp.display(), "could not remove partial file: {}", e),
    }
}
