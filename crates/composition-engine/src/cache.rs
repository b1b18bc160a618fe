//! Finished results keyed by a hash of everything that shapes them.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use plate_types::{BuildOptions, ConfigurationError, NameplateConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::NameplateResult;
use crate::KernelChoice;

/// Hash of a configuration, its build options, the glyph data and the
/// kernel that builds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(pub u64);

impl CacheKey {
    pub fn compute(
        config: &NameplateConfig,
        options: &BuildOptions,
        glyph_fingerprint: u64,
        kernel: KernelChoice,
    ) -> Result<Self, ConfigurationError> {
        let encode = |field: &str, value: Result<Vec<u8>, serde_json::Error>| {
            value.map_err(|e| ConfigurationError::Unsupported {
                field: field.into(),
                value: e.to_string(),
            })
        };
        let config = encode("config", serde_json::to_vec(config))?;
        let options = encode("options", serde_json::to_vec(options))?;

        let mut hasher = DefaultHasher::new();
        config.hash(&mut hasher);
        options.hash(&mut hasher);
        glyph_fingerprint.hash(&mut hasher);
        kernel.hash(&mut hasher);
        Ok(CacheKey(hasher.finish()))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Entries kept by [`ResultCache::new`].
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

#[derive(Debug)]
struct Entry {
    result: Arc<NameplateResult>,
    last_used: AtomicU64,
}

/// Shared cache of finished builds, evicting the least recently used entry
/// once full. Readers never block each other; a hit only bumps an atomic
/// stamp.
#[derive(Debug)]
pub struct ResultCache {
    entries: RwLock<HashMap<CacheKey, Entry>>,
    capacity: usize,
    clock: AtomicU64,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache holding at most `capacity` results. Zero disables caching.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity,
            clock: AtomicU64::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<NameplateResult>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(key)?;
        entry.last_used.store(self.tick(), Ordering::Relaxed);
        Some(Arc::clone(&entry.result))
    }

    pub fn put(&self, key: CacheKey, result: Arc<NameplateResult>) {
        if self.capacity == 0 {
            return;
        }
        let stamp = self.tick();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used.load(Ordering::Relaxed))
                .map(|(k, _)| *k);
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
                debug!(key = %oldest, "evicted cached result");
            }
        }
        entries.insert(
            key,
            Entry {
                result,
                last_used: AtomicU64::new(stamp),
            },
        );
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
