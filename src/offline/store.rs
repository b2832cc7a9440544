//! Versioned on-disk response store.
//!
//! One directory per version tag under the cache root, entries persisted as a
//! single JSON map keyed by request identity. Eviction happens only at
//! activation, by deleting every store whose name is not the current tag.

use super::fetch::{HttpRequest, HttpResponse};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const ENTRIES_FILE: &str = "entries.json";

/// A single named cache store.
pub struct CacheStore {
    dir: PathBuf,
    entries: HashMap<String, HttpResponse>,
}

impl CacheStore {
    /// Open (or create in memory) the store named `tag` under `root`.
    pub fn open(root: &Path, tag: &str) -> Self {
        let dir = root.join(tag);
        let entries = Self::read_entries(&dir).unwrap_or_default();
        Self { dir, entries }
    }

    /// Default cache root: `~/.habitat/cache`.
    pub fn default_root() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".habitat")
            .join("cache")
    }

    fn read_entries(dir: &Path) -> Option<HashMap<String, HttpResponse>> {
        let data = fs::read_to_string(dir.join(ENTRIES_FILE)).ok()?;
        serde_json::from_str(&data).ok()
    }

    /// Cache-first lookup by request identity. No freshness check: a hit is
    /// returned verbatim.
    pub fn lookup(&self, request: &HttpRequest) -> Option<HttpResponse> {
        self.entries.get(&request.identity()).cloned()
    }

    /// Store a response and persist to disk.
    pub fn put(&mut self, request: &HttpRequest, response: HttpResponse) {
        self.entries.insert(request.identity(), response);
        self.persist();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) {
        if let Err(err) = fs::create_dir_all(&self.dir) {
            log::warn!("cache store: cannot create {}: {}", self.dir.display(), err);
            return;
        }
        match serde_json::to_string(&self.entries) {
            Ok(json) => {
                if let Err(err) = fs::write(self.dir.join(ENTRIES_FILE), json) {
                    log::warn!("cache store: cannot persist {}: {}", self.dir.display(), err);
                }
            }
            Err(err) => log::warn!("cache store: cannot serialize entries: {}", err),
        }
    }

    /// Names of all stores currently present under `root`, sorted.
    pub fn store_names(root: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(root)
            .into_iter()
            .flatten()
            .flatten()
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        names.sort();
        names
    }

    /// Delete every store under `root` whose name is not `tag`. After this,
    /// at most one store name is live.
    pub fn activate(root: &Path, tag: &str) {
        for name in Self::store_names(root) {
            if name != tag {
                let stale = root.join(&name);
                match fs::remove_dir_all(&stale) {
                    Ok(()) => log::debug!("cache store: evicted stale store '{}'", name),
                    Err(err) => {
                        log::warn!("cache store: cannot evict '{}': {}", name, err);
                    }
                }
            }
        }
    }
}
