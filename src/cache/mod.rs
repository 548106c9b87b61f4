// Cache module
//
// Typed JSON cache adapter (`RedisCache`) over a pluggable key-value store
// (`Database`), with Redis and in-memory store implementations.

use serde::{Deserialize, Serialize};

pub mod adapter;
pub mod error;
pub mod key;
pub mod memory;
pub mod metrics;
pub mod redis;
pub mod traits;

pub use adapter::RedisCache;
pub use error::CacheError;
pub use memory::MemoryDatabase;
pub use metrics::CacheMetrics;
pub use self::redis::{RedisConfig, RedisDatabase};
pub use traits::{CommandFlags, Database, SetCondition};

/// Adapter-level settings, independent of the store
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CacheConfig {
    /// Prefix prepended to every key as "{prefix}:{key}" (default: none)
    #[serde(default)]
    pub key_prefix: Option<String>,
}

impl CacheConfig {
    /// Applies these settings to an adapter
    pub fn apply<D: Database>(&self, cache: RedisCache<D>) -> RedisCache<D> {
        match &self.key_prefix {
            Some(prefix) if !prefix.is_empty() => cache.with_key_prefix(prefix.clone()),
            _ => cache,
        }
    }

    /// Validate cache configuration
    pub fn validate(&self) -> Result<(), String> {
        if let Some(prefix) = &self.key_prefix {
            key::validate_prefix(prefix).map_err(|e| format!("key_prefix is invalid: {}", e))?;
        }
        Ok(())
    }
}
