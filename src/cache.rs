use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use moka::Expiry;
use moka::sync::Cache as MokaCache;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CacheError, CacheResult};

/// Storage for raw response bodies with server-chosen lifetimes.
///
/// A `get` for an expired entry reports a miss and evicts it. A `put` with a
/// `duration_secs` of zero or less leaves nothing retrievable behind. A `put`
/// always replaces what was stored under the key. Implementations must accept
/// concurrent calls; racing writers for one key resolve last-write-wins.
pub trait Cache: Send + Sync {
    fn get(&self, key: &str) -> CacheResult<Option<String>>;

    fn put(&self, key: &str, value: &str, duration_secs: i64) -> CacheResult<()>;
}

fn ttl_from_secs(duration_secs: i64) -> Option<Duration> {
    u64::try_from(duration_secs)
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    body: Arc<str>,
    expires_at: Instant,
}

/// Expires each entry at its own stored deadline
struct ResponseExpiry;

impl Expiry<String, MemoryEntry> for ResponseExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &MemoryEntry,
        created_at: Instant,
    ) -> Option<Duration> {
        Some(value.expires_at.saturating_duration_since(created_at))
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &MemoryEntry,
        updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.expires_at.saturating_duration_since(updated_at))
    }
}

/// Process-lifetime in-memory cache backed by Moka
pub struct MemoryCache {
    cache: MokaCache<String, MemoryEntry>,
}

impl MemoryCache {
    pub fn new(max_capacity: u64) -> Self {
        let cache = MokaCache::builder()
            .max_capacity(max_capacity)
            .expire_after(ResponseExpiry)
            .build();

        Self { cache }
    }

    pub fn remove(&self, key: &str) {
        self.cache.invalidate(key);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.cache.contains_key(key)
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
    }

    pub fn stats(&self) -> MemoryCacheStats {
        self.cache.run_pending_tasks();

        MemoryCacheStats {
            entry_count: self.cache.entry_count(),
            weighted_size: self.cache.weighted_size(),
        }
    }

    fn put_until(&self, key: &str, value: &str, expires_at: Instant) {
        self.cache.insert(
            key.to_string(),
            MemoryEntry {
                body: Arc::from(value),
                expires_at,
            },
        );
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        match self.cache.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.body.to_string())),
            Some(_) => {
                self.cache.invalidate(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, value: &str, duration_secs: i64) -> CacheResult<()> {
        match ttl_from_secs(duration_secs) {
            Some(ttl) => self.put_until(key, value, Instant::now() + ttl),
            None => self.cache.invalidate(key),
        }
        Ok(())
    }
}

/// Metadata for disk cache entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMetadata {
    pub key: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub size_bytes: u64,
}

impl CacheMetadata {
    pub fn new(key: String, ttl: Duration) -> Self {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::zero());

        Self {
            key,
            created_at: now,
            expires_at,
            size_bytes: 0,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Time left before expiry, `None` once expired
    pub fn remaining(&self) -> Option<Duration> {
        (self.expires_at - Utc::now()).to_std().ok().filter(|d| !d.is_zero())
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size_bytes = size;
        self
    }
}

/// Persistent cache using cacache for corruption-resistant content storage
pub struct DiskCache {
    cache_dir: PathBuf,
}

impl DiskCache {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    pub fn directory(&self) -> &PathBuf {
        &self.cache_dir
    }

    /// Entry body and metadata, or `None` when absent or expired
    fn read_entry(&self, key: &str) -> CacheResult<Option<(String, CacheMetadata)>> {
        let metadata = match self.get_metadata(key)? {
            Some(metadata) if !metadata.is_expired() => metadata,
            Some(_) => {
                self.remove(key)?;
                return Ok(None);
            }
            None => return Ok(None),
        };

        match cacache::read_sync(&self.cache_dir, key) {
            Ok(data) => {
                let body = String::from_utf8(data).map_err(|e| CacheError::Corruption {
                    key: key.to_string(),
                    details: e.to_string(),
                })?;
                Ok(Some((body, metadata)))
            }
            Err(cacache::Error::EntryNotFound(_, _)) => Ok(None),
            Err(e) => Err(CacheError::ReadError {
                key: key.to_string(),
                details: e.to_string(),
            }),
        }
    }

    /// Remove entry data and metadata
    pub fn remove(&self, key: &str) -> CacheResult<()> {
        match cacache::remove_sync(&self.cache_dir, key) {
            Ok(()) | Err(cacache::Error::EntryNotFound(_, _)) => {}
            Err(e) => {
                return Err(CacheError::WriteError {
                    key: key.to_string(),
                    details: e.to_string(),
                });
            }
        }

        match fs::remove_file(self.metadata_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::WriteError {
                key: key.to_string(),
                details: e.to_string(),
            }),
        }
    }

    pub fn contains(&self, key: &str) -> CacheResult<bool> {
        match self.get_metadata(key)? {
            Some(metadata) => Ok(!metadata.is_expired()),
            None => Ok(false),
        }
    }

    pub fn stats(&self) -> CacheResult<CacheStats> {
        let mut stats = CacheStats::default();

        // A missing index just means nothing has been written yet
        if let Ok(entries) = cacache::index::ls(&self.cache_dir).collect::<Result<Vec<_>, _>>() {
            for entry in entries {
                stats.entry_count += 1;
                stats.total_size += entry.size as u64;
            }
        }

        Ok(stats)
    }

    /// Remove every expired entry
    pub fn cleanup_expired(&self) -> CacheResult<CleanupStats> {
        let mut cleanup_stats = CleanupStats::default();

        let entries = match cacache::index::ls(&self.cache_dir).collect::<Result<Vec<_>, _>>() {
            Ok(entries) => entries,
            Err(e) => {
                cleanup_stats
                    .errors
                    .push(format!("Failed to read cache index: {}", e));
                return Ok(cleanup_stats);
            }
        };

        for entry in entries {
            let expired = match self.get_metadata(&entry.key) {
                Ok(Some(metadata)) => metadata.is_expired(),
                Ok(None) => true,
                Err(e) => {
                    warn!(key = %entry.key, error = %e, "Unreadable cache metadata, evicting");
                    true
                }
            };
            if !expired {
                continue;
            }

            cleanup_stats.expired_entries += 1;
            match self.remove(&entry.key) {
                Ok(()) => {
                    cleanup_stats.removed_entries += 1;
                    cleanup_stats.freed_bytes += entry.size as u64;
                }
                Err(e) => cleanup_stats
                    .errors
                    .push(format!("Failed to remove {}: {}", entry.key, e)),
            }
        }

        Ok(cleanup_stats)
    }

    pub fn clear(&self) -> CacheResult<()> {
        cacache::clear_sync(&self.cache_dir).map_err(|e| CacheError::CleanupFailed {
            details: e.to_string(),
        })?;

        match fs::remove_dir_all(self.cache_dir.join("metadata")) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::CleanupFailed {
                details: e.to_string(),
            }),
        }
    }

    fn get_metadata(&self, key: &str) -> CacheResult<Option<CacheMetadata>> {
        match fs::read_to_string(self.metadata_path(key)) {
            Ok(content) => serde_json::from_str(&content)
                .map(Some)
                .map_err(|e| CacheError::Corruption {
                    key: key.to_string(),
                    details: format!("Failed to parse metadata: {}", e),
                }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::ReadError {
                key: key.to_string(),
                details: format!("Failed to read metadata: {}", e),
            }),
        }
    }

    fn set_metadata(&self, key: &str, metadata: &CacheMetadata) -> CacheResult<()> {
        let metadata_path = self.metadata_path(key);
        let write_error = |details: String| CacheError::WriteError {
            key: key.to_string(),
            details,
        };

        if let Some(parent) = metadata_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| write_error(format!("Failed to create metadata directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(metadata)
            .map_err(|e| write_error(format!("Failed to serialize metadata: {}", e)))?;

        fs::write(&metadata_path, content)
            .map_err(|e| write_error(format!("Failed to write metadata: {}", e)))
    }

    fn metadata_path(&self, key: &str) -> PathBuf {
        self.cache_dir
            .join("metadata")
            .join(format!("{}.json", key))
    }
}

impl Cache for DiskCache {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.read_entry(key)?.map(|(body, _)| body))
    }

    fn put(&self, key: &str, value: &str, duration_secs: i64) -> CacheResult<()> {
        let Some(ttl) = ttl_from_secs(duration_secs) else {
            return self.remove(key);
        };

        cacache::write_sync(&self.cache_dir, key, value.as_bytes()).map_err(|e| {
            CacheError::WriteError {
                key: key.to_string(),
                details: e.to_string(),
            }
        })?;

        let metadata = CacheMetadata::new(key.to_string(), ttl).with_size(value.len() as u64);
        self.set_metadata(key, &metadata)
    }
}

/// Two-tier cache: memory first, then disk
pub struct TieredCache {
    memory: MemoryCache,
    disk: DiskCache,
}

impl TieredCache {
    pub fn new(memory: MemoryCache, disk: DiskCache) -> Self {
        Self { memory, disk }
    }

    pub fn memory(&self) -> &MemoryCache {
        &self.memory
    }

    pub fn disk(&self) -> &DiskCache {
        &self.disk
    }

    pub fn stats(&self) -> CacheResult<ComprehensiveCacheStats> {
        Ok(ComprehensiveCacheStats {
            memory: self.memory.stats(),
            disk: self.disk.stats()?,
        })
    }

    pub fn clear(&self) -> CacheResult<()> {
        self.memory.clear();
        self.disk.clear()
    }
}

impl Cache for TieredCache {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        if let Some(body) = self.memory.get(key)? {
            return Ok(Some(body));
        }

        match self.disk.read_entry(key)? {
            Some((body, metadata)) => {
                if let Some(remaining) = metadata.remaining() {
                    debug!(key = %key, "Promoting disk cache entry to memory");
                    self.memory.put_until(key, &body, Instant::now() + remaining);
                }
                Ok(Some(body))
            }
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, value: &str, duration_secs: i64) -> CacheResult<()> {
        self.memory.put(key, value, duration_secs)?;
        self.disk.put(key, value, duration_secs)
    }
}

/// Cache that stores nothing, for running with caching disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCache;

impl Cache for NullCache {
    fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        Ok(None)
    }

    fn put(&self, _key: &str, _value: &str, _duration_secs: i64) -> CacheResult<()> {
        Ok(())
    }
}

/// Statistics for disk cache
#[derive(Debug, Default, Clone)]
pub struct CacheStats {
    pub entry_count: u64,
    pub total_size: u64,
}

#[derive(Debug, Clone)]
pub struct MemoryCacheStats {
    pub entry_count: u64,
    pub weighted_size: u64,
}

#[derive(Debug, Clone)]
pub struct ComprehensiveCacheStats {
    pub memory: MemoryCacheStats,
    pub disk: CacheStats,
}

#[derive(Debug, Default, Clone)]
pub struct CleanupStats {
    pub expired_entries: u64,
    pub removed_entries: u64,
    pub freed_bytes: u64,
    pub errors: Vec<String>,
}
