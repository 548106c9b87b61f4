//! In-process store implementation
//!
//! `MemoryDatabase` keeps JSON strings in a moka cache and honours a
//! time-to-live per entry, so it follows the same semantics as Redis for
//! every `Database` primitive. Useful for tests and single-process
//! deployments that want the adapter without a Redis server.

use async_trait::async_trait;
use moka::sync::Cache;
use moka::Expiry;
use parking_lot::Mutex;
use std::time::{Duration, Instant};

use super::error::CacheError;
use super::traits::{CommandFlags, Database, SetCondition};

/// Default maximum number of entries held in memory
pub const DEFAULT_MAX_ENTRIES: u64 = 100_000;

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    ttl: Option<Duration>,
}

/// Expires each entry after its own ttl, counted from the last write
struct EntryExpiry;

impl Expiry<String, MemoryEntry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &MemoryEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        entry.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &MemoryEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        entry.ttl
    }
}

/// Store handle backed by an in-memory moka cache
pub struct MemoryDatabase {
    entries: Cache<String, MemoryEntry>,
    // Held by every mutating primitive so EXPIRE's read-modify-write cannot
    // re-insert a key that DEL removed in between
    write_lock: Mutex<()>,
}

impl MemoryDatabase {
    /// Create a store holding at most `DEFAULT_MAX_ENTRIES` entries
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }

    /// Create a store holding at most `max_entries` entries
    pub fn with_capacity(max_entries: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(EntryExpiry)
            .build();

        Self {
            entries,
            write_lock: Mutex::new(()),
        }
    }

    /// Number of live entries (approximate until pending tasks run)
    pub fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    /// Remove every entry
    pub fn clear(&self) {
        let _guard = self.write_lock.lock();
        self.entries.invalidate_all();
    }
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    fn key_exists(&self, key: &str, _flags: CommandFlags) -> Result<bool, CacheError> {
        Ok(self.entries.get(key).is_some())
    }

    fn string_get(&self, key: &str, _flags: CommandFlags) -> Result<Option<String>, CacheError> {
        Ok(self.entries.get(key).map(|entry| entry.value))
    }

    fn string_set(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
        condition: SetCondition,
        _flags: CommandFlags,
    ) -> Result<bool, CacheError> {
        if ttl == Some(Duration::ZERO) {
            return Err(CacheError::Redis(
                "invalid expire time in 'set' command".to_string(),
            ));
        }

        let _guard = self.write_lock.lock();
        let allowed = match condition {
            SetCondition::Always => true,
            SetCondition::IfExists => self.entries.get(key).is_some(),
            SetCondition::IfNotExists => self.entries.get(key).is_none(),
        };

        if allowed {
            self.entries.insert(
                key.to_string(),
                MemoryEntry {
                    value: value.to_string(),
                    ttl,
                },
            );
        }
        Ok(allowed)
    }

    fn key_delete(&self, key: &str, _flags: CommandFlags) -> Result<bool, CacheError> {
        let _guard = self.write_lock.lock();
        Ok(self.entries.remove(key).is_some())
    }

    fn key_expire(
        &self,
        key: &str,
        ttl: Option<Duration>,
        _flags: CommandFlags,
    ) -> Result<bool, CacheError> {
        let _guard = self.write_lock.lock();
        match self.entries.get(key) {
            Some(mut entry) => {
                // Redis deletes a key whose new ttl is already elapsed
                if ttl == Some(Duration::ZERO) {
                    self.entries.invalidate(key);
                    return Ok(true);
                }
                // PERSIST only reports success when a ttl was removed
                let changed = ttl.is_some() || entry.ttl.is_some();
                entry.ttl = ttl;
                self.entries.insert(key.to_string(), entry);
                Ok(changed)
            }
            None => Ok(false),
        }
    }

    async fn key_exists_async(&self, key: &str, flags: CommandFlags) -> Result<bool, CacheError> {
        self.key_exists(key, flags)
    }

    async fn string_get_async(
        &self,
        key: &str,
        flags: CommandFlags,
    ) -> Result<Option<String>, CacheError> {
        self.string_get(key, flags)
    }

    async fn string_set_async(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
        condition: SetCondition,
        flags: CommandFlags,
    ) -> Result<bool, CacheError> {
        self.string_set(key, value, ttl, condition, flags)
    }

    async fn key_delete_async(&self, key: &str, flags: CommandFlags) -> Result<bool, CacheError> {
        self.key_delete(key, flags)
    }

    async fn key_expire_async(
        &self,
        key: &str,
        ttl: Option<Duration>,
        flags: CommandFlags,
    ) -> Result<bool, CacheError> {
        self.key_expire(key, ttl, flags)
    }
}
