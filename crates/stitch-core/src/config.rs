use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::registry::PersistMode;

/// Default registry file, relative to the invocation directory.
pub const DEFAULT_REGISTRY_FILE: &str = "cache.json";
/// Default remux executable, relative to the invocation directory.
pub const DEFAULT_REMUX_TOOL: &str = "./ffmpeg";
/// Default extension for the merged output file.
pub const DEFAULT_OUTPUT_EXTENSION: &str = "mp4";

/// HTTP timeouts (optional `[fetch]` section in config.toml).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Wall-clock limit for one segment GET.
    pub segment_timeout_secs: u64,
    /// Wall-clock limit for the manifest GET.
    pub manifest_timeout_secs: u64,
    /// TCP/TLS connect limit for every request.
    pub connect_timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            segment_timeout_secs: 10,
            manifest_timeout_secs: 30,
            connect_timeout_secs: 15,
        }
    }
}

impl FetchConfig {
    pub fn segment_timeout(&self) -> Duration {
        Duration::from_secs(self.segment_timeout_secs)
    }

    pub fn manifest_timeout(&self) -> Duration {
        Duration::from_secs(self.manifest_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Global configuration loaded from `~/.config/stitch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StitchConfig {
    /// JSON file mapping manifest URL to working directory.
    pub registry_path: PathBuf,
    /// How registry mutations reach disk. Write-through unless explicitly batched.
    #[serde(default)]
    pub registry_persist: PersistMode,
    /// Base directory for per-job working directories (None = invocation directory).
    #[serde(default)]
    pub work_root: Option<PathBuf>,
    /// Where merged files are written (None = the user's Downloads directory).
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// Extension of the merged file, without the dot.
    pub output_extension: String,
    /// Remux executable: a path, or a bare name searched on PATH.
    pub remux_tool: PathBuf,
    #[serde(default)]
    pub fetch: FetchConfig,
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            registry_path: PathBuf::from(DEFAULT_REGISTRY_FILE),
            registry_persist: PersistMode::default(),
            work_root: None,
            output_dir: None,
            output_extension: DEFAULT_OUTPUT_EXTENSION.to_string(),
            remux_tool: PathBuf::from(DEFAULT_REMUX_TOOL),
            fetch: FetchConfig::default(),
        }
    }
}

impl StitchConfig {
    /// Output directory to use: configured value, else `~/Downloads`.
    pub fn resolved_output_dir(&self) -> PathBuf {
        if let Some(dir) = &self.output_dir {
            return dir.clone();
        }
        dirs::download_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join("Downloads")))
            .unwrap_or_else(|| PathBuf::from("Downloads"))
    }

    /// Base directory for working directories: configured value, else the current directory.
    pub fn resolved_work_root(&self) -> PathBuf {
        self.work_root.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("stitch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<StitchConfig> {
    load_or_init_at(&config_path()?)
}

/// Like `load_or_init` but at an explicit path (used by tests).
pub fn load_or_init_at(path: &Path) -> Result<StitchConfig> {
    if !path.exists() {
        let default_cfg = StitchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create config dir: {}", parent.display()))?;
        }
        fs::write(path, toml).with_context(|| format!("write config: {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data =
        fs::read_to_string(path).with_context(|| format!("read config: {}", path.display()))?;
    let cfg: StitchConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}
