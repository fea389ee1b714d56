//! Translation cache
//!
//! One phrase -> translation mapping per (source, target) language pair,
//! keyed by the lowercase phrase. The store is created once per session,
//! seeded from a [`CacheStorage`] and handed to every translation pass by
//! reference. Entries never expire.

use crate::error::CacheError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info};

/// Language pair partitioning the cache
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub from: String,
    pub to: String,
}

impl CacheKey {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        CacheKey {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Normalized form a phrase is stored under
pub fn cache_key(phrase: &str) -> String {
    phrase.to_lowercase()
}

type PairMap = HashMap<String, String>;

/// On-disk layout: source language -> target language -> phrase -> translation
pub type PersistedCache = BTreeMap<String, BTreeMap<String, BTreeMap<String, String>>>;

/// Process-wide translation cache
#[derive(Debug, Default)]
pub struct TranslationCacheStore {
    pairs: RwLock<HashMap<CacheKey, PairMap>>,
}

impl TranslationCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapping for one language pair, created on first write
    pub fn cache_for(&self, from: &str, to: &str) -> CacheHandle<'_> {
        CacheHandle {
            store: self,
            key: CacheKey::new(from, to),
        }
    }

    /// Total number of entries across all pairs
    pub fn len(&self) -> usize {
        self.read(|pairs| pairs.values().map(HashMap::len).sum())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read<R>(&self, f: impl FnOnce(&HashMap<CacheKey, PairMap>) -> R) -> R {
        let pairs = self.pairs.read().unwrap_or_else(PoisonError::into_inner);
        f(&pairs)
    }

    fn write<R>(&self, f: impl FnOnce(&mut HashMap<CacheKey, PairMap>) -> R) -> R {
        let mut pairs = self.pairs.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut pairs)
    }

    /// Snapshot of every pair in persisted form
    pub fn snapshot(&self) -> PersistedCache {
        self.read(|pairs| {
            let mut out = PersistedCache::new();
            for (key, entries) in pairs {
                out.entry(key.from.clone())
                    .or_default()
                    .entry(key.to.clone())
                    .or_default()
                    .extend(entries.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            out
        })
    }

    /// Merge persisted entries into the store, overwriting existing ones
    pub fn restore(&self, persisted: PersistedCache) {
        self.write(|pairs| {
            for (from, targets) in persisted {
                for (to, entries) in targets {
                    pairs
                        .entry(CacheKey::new(from.clone(), to))
                        .or_default()
                        .extend(entries.into_iter().map(|(k, v)| (cache_key(&k), v)));
                }
            }
        });
    }

    pub fn load_from(&self, storage: &dyn CacheStorage) -> Result<(), CacheError> {
        let persisted = storage.load()?;
        self.restore(persisted);
        info!("Loaded {} cached translations from {}", self.len(), storage.describe());
        Ok(())
    }

    pub fn persist(&self, storage: &dyn CacheStorage) -> Result<(), CacheError> {
        let snapshot = self.snapshot();
        storage.persist(&snapshot)?;
        info!("Persisted {} cached translations to {}", self.len(), storage.describe());
        Ok(())
    }
}

/// View of one language pair inside a [`TranslationCacheStore`]
#[derive(Debug, Clone)]
pub struct CacheHandle<'s> {
    store: &'s TranslationCacheStore,
    key: CacheKey,
}

impl CacheHandle<'_> {
    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    pub fn has(&self, phrase: &str) -> bool {
        let phrase = cache_key(phrase);
        self.store.read(|pairs| {
            pairs
                .get(&self.key)
                .is_some_and(|entries| entries.contains_key(&phrase))
        })
    }

    pub fn get(&self, phrase: &str) -> Option<String> {
        let phrase = cache_key(phrase);
        self.store
            .read(|pairs| pairs.get(&self.key)?.get(&phrase).cloned())
    }

    /// Insert or overwrite the translation of `phrase`
    pub fn set(&self, phrase: &str, translation: &str) {
        let phrase = cache_key(phrase);
        self.store.write(|pairs| {
            pairs
                .entry(self.key.clone())
                .or_default()
                .insert(phrase, translation.to_string());
        });
    }

    pub fn len(&self) -> usize {
        self.store
            .read(|pairs| pairs.get(&self.key).map_or(0, HashMap::len))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Durable backing for a [`TranslationCacheStore`]
pub trait CacheStorage: Send + Sync {
    /// Everything persisted so far; an absent store is empty, not an error
    fn load(&self) -> Result<PersistedCache, CacheError>;

    fn persist(&self, cache: &PersistedCache) -> Result<(), CacheError>;

    /// Human-readable location, for logs
    fn describe(&self) -> String;
}

/// Cache persisted as one pretty-printed JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStorage { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> CacheError {
        CacheError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    translations: PersistedCache,
}

const CACHE_FILE_VERSION: u32 = 1;

impl CacheStorage for JsonFileStorage {
    fn load(&self) -> Result<PersistedCache, CacheError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("No cache file at {}", self.path.display());
                return Ok(PersistedCache::new());
            }
            Err(err) => return Err(self.io_error(err)),
        };
        let file: CacheFile =
            serde_json::from_str(&content).map_err(|source| CacheError::Format {
                path: self.path.clone(),
                source,
            })?;
        Ok(file.translations)
    }

    fn persist(&self, cache: &PersistedCache) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
        }
        let file = CacheFile {
            version: CACHE_FILE_VERSION,
            translations: cache.clone(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|source| CacheError::Format {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, json).map_err(|err| self.io_error(err))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== Handle Tests ==========

    #[test]
    fn test_set_get_has_are_case_insensitive() {
        let store = TranslationCacheStore::new();
        let cache = store.cache_for("en", "zh-CN");
        assert!(!cache.has("Hello World"));
        assert_eq!(cache.get("hello world"), None);

        cache.set("Hello World", "你好世界");
        assert!(cache.has("hello world"));
        assert!(cache.has("HELLO WORLD"));
        assert_eq!(cache.get("hello WORLD").as_deref(), Some("你好世界"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_set_overwrites() {
        let store = TranslationCacheStore::new();
        let cache = store.cache_for("en", "ja");
        cache.set("save", "保存");
        cache.set("Save", "セーブ");
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("save").as_deref(), Some("セーブ"));
    }

    #[test]
    fn test_pairs_are_isolated() {
        let store = TranslationCacheStore::new();
        store.cache_for("en", "fr").set("open file", "ouvrir le fichier");
        assert!(!store.cache_for("en", "de").has("open file"));
        assert!(!store.cache_for("fr", "en").has("open file"));
        // Language codes are case-sensitive
        assert!(!store.cache_for("en", "FR").has("open file"));
        assert!(store.cache_for("en", "fr").has("open file"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_handles_share_the_store() {
        let store = TranslationCacheStore::new();
        let first = store.cache_for("en", "es");
        let second = store.cache_for("en", "es");
        first.set("thank you", "gracias");
        assert_eq!(second.get("thank you").as_deref(), Some("gracias"));
    }

    // ========== Persistence Tests ==========

    #[test]
    fn test_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("nested").join("cache.json"));

        let store = TranslationCacheStore::new();
        store.cache_for("en", "zh-CN").set("welcome banner", "欢迎横幅");
        store.cache_for("en", "ja").set("welcome banner", "ウェルカムバナー");
        store.persist(&storage).unwrap();

        let restored = TranslationCacheStore::new();
        restored.load_from(&storage).unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(
            restored.cache_for("en", "ja").get("Welcome Banner").as_deref(),
            Some("ウェルカムバナー")
        );
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("absent.json"));
        let store = TranslationCacheStore::new();
        store.load_from(&storage).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = JsonFileStorage::new(&path).load().unwrap_err();
        assert!(matches!(err, CacheError::Format { .. }));
    }

    #[test]
    fn test_load_merges_into_existing_entries() {
        let store = TranslationCacheStore::new();
        store.cache_for("en", "de").set("good morning", "guten Morgen");

        let mut persisted = PersistedCache::new();
        persisted
            .entry("en".to_string())
            .or_default()
            .entry("de".to_string())
            .or_default()
            .insert("Good Night".to_string(), "gute Nacht".to_string());
        store.restore(persisted);

        let cache = store.cache_for("en", "de");
        assert_eq!(cache.len(), 2);
        assert!(cache.has("good night"));
    }
}
