//! Locating the remux executable before launch.

use std::env;
use std::path::{Path, PathBuf};

/// Resolve `configured` to an existing executable file.
///
/// A value with a directory component (`./ffmpeg`, `/usr/bin/ffmpeg`) must
/// exist as given. A bare name (`ffmpeg`) is searched on `PATH`.
pub fn locate_tool(configured: &Path) -> Option<PathBuf> {
    if configured.components().count() > 1 || configured.is_absolute() {
        return is_executable_file(configured).then(|| configured.to_path_buf());
    }
    let path_var = env::var_os("PATH")?;
    env::split_paths(&path_var)
        .flat_map(|dir| candidates(&dir, configured))
        .find(|p| is_executable_file(p))
}

#[cfg(windows)]
fn candidates(dir: &Path, name: &Path) -> Vec<PathBuf> {
    let plain = dir.join(name);
    let mut exe = plain.clone().into_os_string();
    exe.push(".exe");
    vec![plain, PathBuf::from(exe)]
}

#[cfg(not(windows))]
fn candidates(dir: &Path, name: &Path) -> Vec<PathBuf> {
    vec![dir.join(name)]
}

#[cfg(unix)]
fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable_file(path: &Path) -> bool {
    path.is_file()
}
