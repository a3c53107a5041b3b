//! Persistent job registry: manifest URL -> working directory name.
//!
//! The whole mapping is rewritten to the backing store on every mutation
//! (write-through), so a crash right after `put`/`delete` returns never loses
//! that mutation. Batched persistence is available as an opt-in for callers
//! that mutate many entries at once.

mod store;

pub use store::{FileStore, MemoryStore, RegistryStore};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How mutations reach the backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PersistMode {
    /// Save the full mapping before every mutating call returns.
    #[default]
    WriteThrough,
    /// Only save on `flush()` (and best-effort on drop).
    Batched,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to save job registry to {location}: {source}")]
    Save {
        location: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize job registry: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// URL -> working directory map with an injected backing store.
pub struct JobRegistry {
    store: Box<dyn RegistryStore>,
    jobs: BTreeMap<String, String>,
    mode: PersistMode,
    dirty: bool,
}

impl JobRegistry {
    /// Open a write-through registry over `store`.
    pub fn open(store: impl RegistryStore + 'static) -> Self {
        Self::open_with_mode(store, PersistMode::WriteThrough)
    }

    /// Open a registry over `store`. An absent store is initialized to `{}`;
    /// unreadable or malformed contents degrade to an empty mapping with a warning.
    pub fn open_with_mode(store: impl RegistryStore + 'static, mode: PersistMode) -> Self {
        let store: Box<dyn RegistryStore> = Box::new(store);
        let jobs = load_jobs(store.as_ref());
        Self {
            store,
            jobs,
            mode,
            dirty: false,
        }
    }

    /// Convenience for the default on-disk registry.
    pub fn open_file(path: impl Into<std::path::PathBuf>, mode: PersistMode) -> Self {
        Self::open_with_mode(FileStore::new(path), mode)
    }

    pub fn get(&self, url: &str) -> Option<&str> {
        self.jobs.get(url).map(String::as_str)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.jobs.contains_key(url)
    }

    /// Insert or replace the working directory for `url`.
    pub fn put(&mut self, url: &str, working_dir: &str) -> Result<(), RegistryError> {
        self.jobs.insert(url.to_string(), working_dir.to_string());
        self.mutated()
    }

    /// Remove `url`. Returns whether an entry existed; the store is only
    /// rewritten when something was removed.
    pub fn delete(&mut self, url: &str) -> Result<bool, RegistryError> {
        if self.jobs.remove(url).is_none() {
            return Ok(false);
        }
        self.mutated()?;
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Entries in URL order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.jobs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn mode(&self) -> PersistMode {
        self.mode
    }

    pub fn location(&self) -> String {
        self.store.location()
    }

    /// Write pending batched mutations. No-op when nothing changed.
    pub fn flush(&mut self) -> Result<(), RegistryError> {
        if !self.dirty {
            return Ok(());
        }
        self.save()
    }

    fn mutated(&mut self) -> Result<(), RegistryError> {
        self.dirty = true;
        match self.mode {
            PersistMode::WriteThrough => self.save(),
            PersistMode::Batched => Ok(()),
        }
    }

    fn save(&mut self) -> Result<(), RegistryError> {
        let json = serde_json::to_vec_pretty(&self.jobs)?;
        self.store
            .save(&json)
            .map_err(|source| RegistryError::Save {
                location: self.store.location(),
                source,
            })?;
        self.dirty = false;
        tracing::debug!(jobs = self.jobs.len(), "saved job registry to {}", self.store.location());
        Ok(())
    }
}

impl Drop for JobRegistry {
    fn drop(&mut self) {
        if self.dirty {
            if let Err(e) = self.save() {
                tracing::warn!("unsaved job registry changes lost: {}", e);
            }
        }
    }
}

fn load_jobs(store: &dyn RegistryStore) -> BTreeMap<String, String> {
    let bytes = match store.load() {
        Ok(Some(b)) => b,
        Ok(None) => {
            if let Err(e) = store.save(b"{}") {
                tracing::warn!("could not create job registry at {}: {}", store.location(), e);
            }
            return BTreeMap::new();
        }
        Err(e) => {
            tracing::warn!("failed to load job registry from {}: {}", store.location(), e);
            return BTreeMap::new();
        }
    };
    match serde_json::from_slice::<BTreeMap<String, String>>(&bytes) {
        Ok(jobs) => jobs,
        Err(e) => {
            tracing::warn!(
                "job registry at {} is malformed, starting empty: {}",
                store.location(),
                e
            );
            BTreeMap::new()
        }
    }
}
