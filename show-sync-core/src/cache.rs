use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::ProviderError;

/// Cache format version. Bump this when changing the cached entity layout to
/// invalidate stale entries automatically.
const CACHE_VERSION: u32 = 1;

/// Metadata file tracking the format of one provider's cache directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CacheMeta {
    /// Cache format version; a mismatch triggers automatic invalidation.
    #[serde(default)]
    version: u32,
}

/// One cached entity plus the date it was fetched from the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub fetched_at: NaiveDate,
    pub value: T,
}

/// Counters for display purposes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    pub entries: usize,
    pub total_size: u64,
}

/// Get the root cache directory for show-sync provider data.
pub fn cache_root() -> Result<PathBuf, ProviderError> {
    let base = dirs::cache_dir()
        .ok_or_else(|| ProviderError::cache("Could not determine cache directory"))?;
    Ok(base.join("show-sync"))
}

/// On-disk cache of provider entities, one JSON file per IMDB ID.
///
/// Each provider gets its own directory with its own `meta.json`. Entries
/// older than the provider's TTL read as absent; a `meta.json` version
/// mismatch wipes the directory on open.
#[derive(Debug, Clone)]
pub struct EntityCache {
    dir: PathBuf,
    ttl_days: i64,
}

impl EntityCache {
    /// Open (creating if needed) the cache directory for a provider.
    pub fn open(provider: &str, ttl_days: i64) -> Result<Self, ProviderError> {
        Self::open_under(&cache_root()?, provider, ttl_days)
    }

    /// Open a cache under an explicit root. Tests point this at a temp dir.
    pub fn open_under(root: &Path, provider: &str, ttl_days: i64) -> Result<Self, ProviderError> {
        let cache = Self {
            dir: root.join(provider),
            ttl_days,
        };
        cache.ensure_meta()?;
        Ok(cache)
    }

    fn meta_path(&self) -> PathBuf {
        self.dir.join("meta.json")
    }

    fn entry_path(&self, imdb_id: &str) -> PathBuf {
        self.dir.join(format!("{imdb_id}.json"))
    }

    /// Validate the meta file, wiping stale data on a version mismatch.
    fn ensure_meta(&self) -> Result<(), ProviderError> {
        let path = self.meta_path();
        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let meta: CacheMeta = serde_json::from_str(&contents)?;
            if meta.version == CACHE_VERSION {
                return Ok(());
            }
            // Stale cache from an older format, wipe it
            let _ = self.clear();
        }
        fs::create_dir_all(&self.dir)?;
        let meta = CacheMeta {
            version: CACHE_VERSION,
        };
        fs::write(&path, serde_json::to_string_pretty(&meta)?)?;
        Ok(())
    }

    /// Load an unexpired entry, or `None` on a miss.
    ///
    /// Unreadable entries are treated as misses so a damaged file re-fetches
    /// instead of wedging the sync.
    pub fn load<T: DeserializeOwned>(
        &self,
        imdb_id: &str,
        today: NaiveDate,
    ) -> Result<Option<CacheEntry<T>>, ProviderError> {
        let path = self.entry_path(imdb_id);
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)?;
        let entry: CacheEntry<T> = match serde_json::from_str(&contents) {
            Ok(e) => e,
            Err(e) => {
                log::warn!("Discarding unreadable cache entry {}: {e}", path.display());
                return Ok(None);
            }
        };
        if (today - entry.fetched_at).num_days() >= self.ttl_days {
            log::debug!("Cache entry for {imdb_id} expired ({})", entry.fetched_at);
            return Ok(None);
        }
        Ok(Some(entry))
    }

    /// Write an entry, replacing any previous one for the same ID.
    pub fn store<T: Serialize>(
        &self,
        imdb_id: &str,
        entry: &CacheEntry<T>,
    ) -> Result<(), ProviderError> {
        fs::create_dir_all(&self.dir)?;
        let contents = serde_json::to_string(entry)?;
        fs::write(self.entry_path(imdb_id), contents)?;
        Ok(())
    }

    /// Remove all cached files (including the meta file).
    /// Returns the number of bytes freed.
    pub fn clear(&self) -> Result<u64, ProviderError> {
        let mut total_size = 0u64;
        if self.dir.exists() {
            for entry in fs::read_dir(&self.dir)?.flatten() {
                let path = entry.path();
                if path.is_file() {
                    if let Ok(meta) = fs::metadata(&path) {
                        total_size += meta.len();
                    }
                    fs::remove_file(&path)?;
                }
            }
        }
        Ok(total_size)
    }

    /// Count entries and bytes on disk (the meta file is not an entry).
    pub fn stats(&self) -> Result<CacheStats, ProviderError> {
        let mut stats = CacheStats::default();
        if !self.dir.exists() {
            return Ok(stats);
        }
        for entry in fs::read_dir(&self.dir)?.flatten() {
            let path = entry.path();
            if !path.is_file() || path == self.meta_path() {
                continue;
            }
            stats.entries += 1;
            if let Ok(meta) = fs::metadata(&path) {
                stats.total_size += meta.len();
            }
        }
        Ok(stats)
    }
}
