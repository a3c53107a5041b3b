//! A job ties a manifest URL to the working directory holding its segments.

use rand::distributions::{Alphanumeric, DistString};
use std::path::{Path, PathBuf};

use crate::registry::{JobRegistry, RegistryError};

/// Length of generated working-directory names.
pub const TOKEN_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub source_url: String,
    /// Directory name as stored in the registry; also the output file stem.
    pub working_dir: String,
}

impl Job {
    /// Resolve the job for `url`, registering a new one if needed.
    ///
    /// A registered URL keeps its directory even when `requested_dir` names a
    /// different one. New jobs use `requested_dir` or a random 16-character
    /// alphanumeric token.
    pub fn open(
        registry: &mut JobRegistry,
        url: &str,
        requested_dir: Option<&str>,
    ) -> Result<Self, RegistryError> {
        if let Some(existing) = registry.get(url) {
            if let Some(req) = requested_dir.filter(|r| *r != existing) {
                tracing::warn!(
                    "{} is already tracked in {}; ignoring requested directory {}",
                    url,
                    existing,
                    req
                );
            }
            tracing::info!("resuming job for {} in {}", url, existing);
            return Ok(Self {
                source_url: url.to_string(),
                working_dir: existing.to_string(),
            });
        }

        let working_dir = requested_dir
            .map(str::to_string)
            .unwrap_or_else(|| random_token(TOKEN_LEN));
        registry.put(url, &working_dir)?;
        tracing::info!("new job for {} in {}", url, working_dir);
        Ok(Self {
            source_url: url.to_string(),
            working_dir,
        })
    }

    /// Working directory resolved against `work_root`.
    pub fn dir_in(&self, work_root: &Path) -> PathBuf {
        work_root.join(&self.working_dir)
    }
}

/// Random `[A-Za-z0-9]` string from the thread-local CSPRNG.
pub fn random_token(len: usize) -> String {
    Alphanumeric.sample_string(&mut rand::thread_rng(), len)
}
