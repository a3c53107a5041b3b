//! `stitch forget <url>` – drop a job; optionally delete its working directory with --delete-files.

use anyhow::{Context, Result};
use std::path::Path;
use stitch_core::cleanup::remove_tree;
use stitch_core::registry::JobRegistry;

/// Removes `url` from the registry. With `delete_files`, the job's working
/// directory under `work_root` is deleted as well.
pub fn run_forget(
    registry: &mut JobRegistry,
    work_root: &Path,
    url: &str,
    delete_files: bool,
) -> Result<()> {
    let Some(dir) = registry.get(url).map(str::to_string) else {
        println!("No job tracked for {url}");
        return Ok(());
    };

    registry.delete(url)?;

    if delete_files {
        let path = work_root.join(&dir);
        if path.exists() {
            remove_tree(&path)
                .with_context(|| format!("deleting working directory {}", path.display()))?;
            tracing::debug!(path = %path.display(), "deleted working directory");
        }
    }

    println!("Forgot job {dir} ({url})");
    Ok(())
}
