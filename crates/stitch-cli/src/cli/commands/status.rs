//! `stitch status` – list tracked jobs and how many segments each has on disk.

use anyhow::Result;
use std::fs;
use std::path::Path;
use stitch_core::fs_util::TEMP_SUFFIX;
use stitch_core::merge_list::MERGE_LIST_FILE;
use stitch_core::registry::JobRegistry;

pub fn run_status(registry: &JobRegistry, work_root: &Path) -> Result<()> {
    if registry.is_empty() {
        println!("No tracked jobs.");
        return Ok(());
    }

    println!("{:<18} {:<9} {}", "DIRECTORY", "SEGMENTS", "URL");
    for (url, dir) in registry.iter() {
        let segments = segments_on_disk(&work_root.join(dir))
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{:<18} {:<9} {}", dir, segments, url);
    }
    Ok(())
}

/// Non-empty segment files in `dir`, or None when the directory is missing.
fn segments_on_disk(dir: &Path) -> Option<usize> {
    let entries = fs::read_dir(dir).ok()?;
    let count = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            let name = e.file_name();
            let name = name.to_string_lossy();
            name != MERGE_LIST_FILE && !name.ends_with(TEMP_SUFFIX)
        })
        .filter(|e| e.metadata().map(|m| m.is_file() && m.len() > 0).unwrap_or(false))
        .count();
    Some(count)
}
