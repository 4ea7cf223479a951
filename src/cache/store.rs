//! Flat-file JSON response cache.
//!
//! One JSON object per cache file, mapping string keys to arbitrary JSON
//! values. The file is read once at open and rewritten whole on every
//! insert. There is no eviction, no TTL, and no cross-process locking:
//! two processes writing the same file race and the last writer wins —
//! an accepted limitation for a single-operator experiment driver.

use std::collections::BTreeMap;
use std::fs;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde_json::Value;
use tracing::{debug, warn};

use crate::Result;
use crate::telemetry;

// ---------------------------------------------------------------------------
// FileCache
// ---------------------------------------------------------------------------

/// Persistent key→value cache backed by a single JSON file.
pub struct FileCache {
    name: &'static str,
    path: PathBuf,
    entries: Mutex<BTreeMap<String, Value>>,
}

impl FileCache {
    /// Open a cache file, loading any existing entries.
    ///
    /// A missing file starts the cache empty; an unparseable file is
    /// logged and treated as empty (it will be overwritten by the next
    /// insert). `name` labels the cache in logs and metrics.
    pub fn open(name: &'static str, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = fs::create_dir_all(parent) {
                    warn!(cache = name, path = %parent.display(), error = %e,
                        "could not create cache directory");
                }
            }
        }

        let entries = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<BTreeMap<String, Value>>(&text) {
                Ok(map) => map,
                Err(e) => {
                    warn!(cache = name, path = %path.display(), error = %e,
                        "cache file unreadable, starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(cache = name, path = %path.display(), error = %e,
                    "cache file unreadable, starting empty");
                BTreeMap::new()
            }
        };

        debug!(cache = name, path = %path.display(), entries = entries.len(), "cache opened");
        Self {
            name,
            path,
            entries: Mutex::new(entries),
        }
    }

    /// Look up a stored value. Emits cache hit/miss metrics.
    pub fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match entries.get(key) {
            Some(value) => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL, "cache" => self.name).increment(1);
                debug!(cache = self.name, key, "cache hit");
                Some(value.clone())
            }
            None => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "cache" => self.name).increment(1);
                debug!(cache = self.name, key, "cache miss");
                None
            }
        }
    }

    /// Insert a value and flush the whole map to disk.
    ///
    /// Flush failures are logged, not raised: the in-memory entry still
    /// serves the rest of this run.
    pub fn put(&self, key: &str, value: Value) {
        let text = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            entries.insert(key.to_string(), value);
            serde_json::to_string_pretty(&*entries)
        };
        match text {
            Ok(text) => {
                if let Err(e) = fs::write(&self.path, text) {
                    warn!(cache = self.name, path = %self.path.display(), error = %e,
                        "cache flush failed, entry kept in memory only");
                }
            }
            Err(e) => {
                warn!(cache = self.name, error = %e, "cache serialization failed");
            }
        }
    }

    /// Return the cached value for `key`, or run `compute`, store its
    /// result, and return that.
    ///
    /// The boolean is the hit flag: `true` means the value came from the
    /// cache and `compute` never ran. Compute errors propagate and leave
    /// the cache untouched.
    pub async fn get_or_compute<F, Fut>(&self, key: &str, compute: F) -> Result<(Value, bool)>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        if let Some(value) = self.get(key) {
            return Ok((value, true));
        }
        let value = compute().await?;
        self.put(key, value.clone());
        Ok((value, false))
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RagsweepError;
    use serde_json::json;

    #[tokio::test]
    async fn get_or_compute_miss_then_hit() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::open("search", dir.path().join("cache.json"));

        let (value, hit) = cache
            .get_or_compute("idx|hello|k=3|semantic=0", || async {
                Ok(json!(["doc one", "doc two"]))
            })
            .await
            .unwrap();
        assert!(!hit);
        assert_eq!(value, json!(["doc one", "doc two"]));

        // second call must not invoke the closure
        let (value, hit) = cache
            .get_or_compute("idx|hello|k=3|semantic=0", || async {
                panic!("compute ran on a cache hit")
            })
            .await
            .unwrap();
        assert!(hit);
        assert_eq!(value, json!(["doc one", "doc two"]));
    }

    #[tokio::test]
    async fn compute_error_stores_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::open("search", dir.path().join("cache.json"));

        let result = cache
            .get_or_compute("key", || async {
                Err(RagsweepError::Http("connection refused".into()))
            })
            .await;
        assert!(result.is_err());
        assert!(cache.is_empty());
        assert!(cache.get("key").is_none());
    }

    #[test]
    fn file_based_cache_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        {
            let cache = FileCache::open("llm", &path);
            cache.put("k1", json!({"content": "hello", "usage": {}}));
            assert_eq!(cache.len(), 1);
        }

        // Reopen and verify persistence.
        {
            let cache = FileCache::open("llm", &path);
            assert_eq!(
                cache.get("k1"),
                Some(json!({"content": "hello", "usage": {}}))
            );
        }
    }

    #[test]
    fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::open("search", dir.path().join("does-not-exist.json"));
        assert!(cache.is_empty());
    }

    #[test]
    fn corrupt_file_starts_empty_and_recovers_on_put() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "{ not json").unwrap();

        let cache = FileCache::open("search", &path);
        assert!(cache.is_empty());

        cache.put("k", json!(1));
        let reopened = FileCache::open("search", &path);
        assert_eq!(reopened.get("k"), Some(json!(1)));
    }

    #[test]
    fn last_writer_wins_for_same_key() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::open("llm", dir.path().join("cache.json"));
        cache.put("k", json!("original"));
        cache.put("k", json!("updated"));
        assert_eq!(cache.get("k"), Some(json!("updated")));
        assert_eq!(cache.len(), 1);
    }
}
