//! Process-local key-value cache.
//!
//! Stores per-item image references under `img-{id}` and whole serialized
//! collections under the raw user-id key. Entries are written once per
//! successful fetch and never expired — cache invalidation is a known gap
//! in the design, kept deliberately, not an optimization target.
//!
//! [`FileCache`] persists to `~/.gamescout/cache/store.json` so entries
//! survive process restarts; [`MemoryCache`] backs tests and ephemeral runs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Cache key for an item's image reference.
pub fn image_key(id: &str) -> String {
    format!("img-{id}")
}

/// Plain string key-value store shared by the fetcher and the presenter.
///
/// `put` overwrites silently; there is no eviction, TTL, or capacity bound.
/// Methods take `&self` so a single cache can be shared as
/// `Arc<dyn KvCache>` across pipeline components.
pub trait KvCache: Send + Sync {
    /// Store `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: &str);

    /// Look up the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;
}

/// In-memory cache with no persistence.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvCache for MemoryCache {
    fn put(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .expect("cache mutex poisoned")
            .insert(key.to_string(), value.to_string());
    }

    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .expect("cache mutex poisoned")
            .get(key)
            .cloned()
    }
}

/// Persisted store serialized to JSON.
#[derive(Debug, Serialize, Deserialize, Default)]
struct CacheStore {
    entries: HashMap<String, String>,
}

/// File-backed cache persisted to `~/.gamescout/cache/store.json`.
///
/// The whole map is rewritten after each `put`. A missing or corrupt file
/// starts the store empty rather than failing.
pub struct FileCache {
    store: Mutex<CacheStore>,
    path: PathBuf,
}

impl FileCache {
    /// Open the default cache location under the user's home directory.
    pub fn open_default() -> Self {
        let path = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".gamescout")
            .join("cache")
            .join("store.json");
        Self::open(path)
    }

    /// Open a cache at an explicit path, loading existing entries.
    pub fn open(path: PathBuf) -> Self {
        let store = Self::load_from_disk(&path);
        Self {
            store: Mutex::new(store),
            path,
        }
    }

    /// Remove all entries and rewrite the backing file.
    pub fn clear(&self) {
        let mut store = self.store.lock().expect("cache mutex poisoned");
        store.entries.clear();
        Self::save_to_disk(&self.path, &store);
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.store
            .lock()
            .expect("cache mutex poisoned")
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn load_from_disk(path: &Path) -> CacheStore {
        match std::fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(store) => store,
                Err(e) => {
                    warn!("Cache file is corrupt, starting empty: {}", e);
                    CacheStore::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => CacheStore::default(),
            Err(e) => {
                warn!("Failed to read cache file, starting empty: {}", e);
                CacheStore::default()
            }
        }
    }

    fn save_to_disk(path: &Path, store: &CacheStore) {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Ok(data) = serde_json::to_string_pretty(store) {
            if let Err(e) = std::fs::write(path, data) {
                warn!("Failed to save cache file: {}", e);
            }
        }
    }
}

impl KvCache for FileCache {
    fn put(&self, key: &str, value: &str) {
        let mut store = self.store.lock().expect("cache mutex poisoned");
        store.entries.insert(key.to_string(), value.to_string());
        Self::save_to_disk(&self.path, &store);
    }

    fn get(&self, key: &str) -> Option<String> {
        self.store
            .lock()
            .expect("cache mutex poisoned")
            .entries
            .get(key)
            .cloned()
    }
}
