//! On-disk JSON response cache with TTL and stale-fallback reads.
//!
//! Each namespace is a directory; each key is a file named by the SHA-256
//! of the key. The envelope records when the value was stored so reads can
//! enforce a TTL. [`FileCache::get_stale`] ignores age entirely; the API
//! clients use it to prefer a stale answer over none when the upstream is
//! unreachable, with no staleness ceiling.
//!
//! Cache IO is best-effort: failures are logged and treated as a miss,
//! never surfaced to callers.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    stored_at: i64,
    value: T,
}

/// A namespaced on-disk cache of JSON-serializable values.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Creates a cache rooted at `cache_root/namespace`. The directory is
    /// created lazily on the first write.
    #[must_use]
    pub fn new(cache_root: &Path, namespace: &str) -> Self {
        Self {
            dir: cache_root.join(namespace),
        }
    }

    /// Returns the cached value for `key` if it is strictly younger than
    /// `ttl`. A zero TTL therefore never serves a fresh hit.
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, key: &str, ttl: Duration) -> Option<T> {
        let envelope = self.read_envelope::<T>(key)?;
        let age = chrono::Utc::now().timestamp() - envelope.stored_at;
        if age < 0 || u64::try_from(age).is_ok_and(|a| a < ttl.as_secs()) {
            Some(envelope.value)
        } else {
            None
        }
    }

    /// Returns the cached value for `key` regardless of its age.
    #[must_use]
    pub fn get_stale<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.read_envelope::<T>(key).map(|e| e.value)
    }

    /// Stores `value` under `key`, stamping it with the current time.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) {
        let envelope = Envelope {
            stored_at: chrono::Utc::now().timestamp(),
            value,
        };
        let path = self.path_for(key);
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            tracing::warn!(dir = %self.dir.display(), error = %e, "cache dir creation failed");
            return;
        }
        match serde_json::to_vec(&envelope) {
            Ok(bytes) => {
                if let Err(e) = std::fs::write(&path, bytes) {
                    tracing::warn!(path = %path.display(), error = %e, "cache write failed");
                }
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "cache serialization failed");
            }
        }
    }

    fn read_envelope<T: DeserializeOwned>(&self, key: &str) -> Option<Envelope<T>> {
        let path = self.path_for(key);
        let bytes = std::fs::read(&path).ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(envelope) => Some(envelope),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "discarding unreadable cache entry");
                None
            }
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        let mut name = String::with_capacity(69);
        for byte in digest {
            use std::fmt::Write;
            let _ = write!(name, "{byte:02x}");
        }
        name.push_str(".json");
        self.dir.join(name)
    }
}
