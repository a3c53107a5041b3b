//! Ordered list of completed segment files, in the concat-demuxer format
//! (`file '<name>'` per line).
//!
//! The list is rebuilt at the start of every run: the engine truncates it,
//! then appends each segment as it is resumed or fetched, in manifest order.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::fs_util::{ensure_dir, FsError};

/// Merge list file name inside the working directory.
pub const MERGE_LIST_FILE: &str = "merge_file.txt";

/// Append-only handle to `<working_dir>/merge_file.txt` for one run.
#[derive(Debug)]
pub struct MergeList {
    path: PathBuf,
    recorded: HashSet<String>,
    len: usize,
}

impl MergeList {
    /// Create the working directory if needed and start an empty list.
    pub fn start(working_dir: &Path) -> Result<Self, FsError> {
        ensure_dir(working_dir)?;
        let path = working_dir.join(MERGE_LIST_FILE);
        fs::write(&path, b"").map_err(|source| FsError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            recorded: HashSet::new(),
            len: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append `filename` unless it is already listed. Returns whether a line was written.
    pub fn append(&mut self, filename: &str) -> Result<bool, FsError> {
        if self.recorded.contains(filename) {
            return Ok(false);
        }
        let line = entry_line(filename);
        let write = || -> io::Result<()> {
            let mut f = OpenOptions::new().create(true).append(true).open(&self.path)?;
            f.write_all(line.as_bytes())
        };
        write().map_err(|source| FsError::Write {
            path: self.path.clone(),
            source,
        })?;
        self.recorded.insert(filename.to_string());
        self.len += 1;
        Ok(true)
    }
}

/// `file '<name>'` with embedded single quotes escaped the way ffmpeg expects.
fn entry_line(filename: &str) -> String {
    format!("file '{}'\n", filename.replace('\'', r"'\''"))
}

/// Read back the file names listed in a merge list.
pub fn read_entries(path: &Path) -> io::Result<Vec<String>> {
    let text = fs::read_to_string(path)?;
    Ok(text
        .lines()
        .filter_map(|line| {
            let inner = line.trim().strip_prefix("file '")?.strip_suffix('\'')?;
            Some(inner.replace(r"'\''", "'"))
        })
        .collect())
}
