//! Post-merge cleanup: forget the job and delete its working directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::registry::{JobRegistry, RegistryError};

#[derive(Debug, thiserror::Error)]
pub enum CleanupError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("cannot list directory {}: {source}", path.display())]
    Unlistable {
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

/// Drop `url` from the registry, then delete `working_dir` depth-first.
/// Only call after a successful merge.
pub fn finalize_job(
    registry: &mut JobRegistry,
    url: &str,
    working_dir: &Path,
) -> Result<(), CleanupError> {
    registry.delete(url)?;
    match fs::symlink_metadata(working_dir) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("working directory {} already gone", working_dir.display());
            Ok(())
        }
        _ => {
            remove_tree(working_dir)?;
            tracing::info!("removed working directory {}", working_dir.display());
            Ok(())
        }
    }
}

/// Remove `dir` and everything below it. Children go first (subdirectories
/// recursed before their own removal), then `dir` itself.
pub fn remove_tree(dir: &Path) -> Result<(), CleanupError> {
    let entries = fs::read_dir(dir).map_err(|source| CleanupError::Unlistable {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| CleanupError::Unlistable {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let is_dir = entry
            .file_type()
            .map(|t| t.is_dir())
            .map_err(|source| CleanupError::Remove {
                path: path.clone(),
                source,
            })?;
        if is_dir {
            remove_tree(&path)?;
        } else {
            fs::remove_file(&path).map_err(|source| CleanupError::Remove {
                path: path.clone(),
                source,
            })?;
        }
    }
    fs::remove_dir(dir).map_err(|source| CleanupError::Remove {
        path: dir.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MemoryStore;

    #[test]
    fn remove_tree_deletes_nested_contents() {
        let root = tempfile::tempdir().unwrap();
        let job = root.path().join("job");
        fs::create_dir_all(job.join("sub").join("deeper")).unwrap();
        fs::write(job.join("seg0.ts"), b"x").unwrap();
        fs::write(job.join("sub").join("a.ts"), b"x").unwrap();
        fs::write(job.join("sub").join("deeper").join("b.ts"), b"x").unwrap();

        remove_tree(&job).unwrap();
        assert!(!job.exists());
        assert!(root.path().exists());
    }

    #[test]
    fn remove_tree_on_missing_dir_is_unlistable() {
        let root = tempfile::tempdir().unwrap();
        let err = remove_tree(&root.path().join("nope")).unwrap_err();
        assert!(matches!(err, CleanupError::Unlistable { .. }));
    }

    #[test]
    fn remove_tree_on_file_is_unlistable() {
        let root = tempfile::tempdir().unwrap();
        let file = root.path().join("file.ts");
        fs::write(&file, b"x").unwrap();
        let err = remove_tree(&file).unwrap_err();
        assert!(matches!(err, CleanupError::Unlistable { .. }));
        assert!(file.exists());
    }

    #[test]
    fn finalize_job_forgets_url_and_deletes_dir() {
        let root = tempfile::tempdir().unwrap();
        let job = root.path().join("job");
        fs::create_dir_all(&job).unwrap();
        fs::write(job.join("merge_file.txt"), b"file 'a.ts'\n").unwrap();

        let store = MemoryStore::new();
        let mut reg = JobRegistry::open(store.clone());
        reg.put("http://h/p.m3u8", "job").unwrap();

        finalize_job(&mut reg, "http://h/p.m3u8", &job).unwrap();
        assert!(!reg.contains("http://h/p.m3u8"));
        assert!(!job.exists());
        assert_eq!(JobRegistry::open(store).len(), 0);
    }

    #[test]
    fn finalize_job_tolerates_missing_dir() {
        let root = tempfile::tempdir().unwrap();
        let mut reg = JobRegistry::open(MemoryStore::new());
        reg.put("u", "gone").unwrap();
        finalize_job(&mut reg, "u", &root.path().join("gone")).unwrap();
        assert!(reg.is_empty());
    }
}
