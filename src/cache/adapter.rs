//! Typed JSON cache adapter
//!
//! `RedisCache` turns typed application calls into store primitives:
//! values are written as JSON text and read back into the caller's type.
//! Every call is forwarded with [`CommandFlags::None`]; writes always
//! overwrite ([`SetCondition::Always`]). Retries, batching and eviction are
//! left to the store.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use super::error::CacheError;
use super::key::{format_key, validate_key};
use super::metrics::CacheMetrics;
use super::traits::{CommandFlags, Database, SetCondition};

const OP_EXISTS: &str = "exists";
const OP_GET: &str = "get";
const OP_SET: &str = "set";
const OP_REMOVE: &str = "remove";
const OP_EXPIRE: &str = "expire";

/// JSON cache adapter over a shared store handle
pub struct RedisCache<D: Database> {
    database: Arc<D>,
    key_prefix: Option<String>,
}

impl<D: Database> Clone for RedisCache<D> {
    fn clone(&self) -> Self {
        Self {
            database: Arc::clone(&self.database),
            key_prefix: self.key_prefix.clone(),
        }
    }
}

impl<D: Database> std::fmt::Debug for RedisCache<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("database", &self.database_type())
            .field("key_prefix", &self.key_prefix)
            .finish()
    }
}

impl<D: Database> RedisCache<D> {
    /// Creates an adapter that owns the given store handle
    pub fn new(database: D) -> Self {
        Self::from_shared(Arc::new(database))
    }

    /// Creates an adapter over a handle shared with other code
    pub fn from_shared(database: Arc<D>) -> Self {
        Self {
            database,
            key_prefix: None,
        }
    }

    /// Namespaces every key as "{prefix}:{key}"
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    pub fn key_prefix(&self) -> Option<&str> {
        self.key_prefix.as_deref()
    }

    /// Returns the underlying store handle for store-specific features
    pub fn database(&self) -> &Arc<D> {
        &self.database
    }

    /// Returns the type name of the underlying store handle
    pub fn database_type(&self) -> &'static str {
        std::any::type_name::<D>()
    }

    /// Checks whether a key is present
    pub async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let key = self.store_key(key)?;
        let _timer = CacheMetrics::global().start_operation(OP_EXISTS);
        let result = self
            .database
            .key_exists_async(&key, CommandFlags::None)
            .await;
        finish(OP_EXISTS, &key, result)
    }

    /// Blocking form of [`exists`](Self::exists)
    pub fn exists_blocking(&self, key: &str) -> Result<bool, CacheError> {
        let key = self.store_key(key)?;
        let _timer = CacheMetrics::global().start_operation(OP_EXISTS);
        let result = self.database.key_exists(&key, CommandFlags::None);
        finish(OP_EXISTS, &key, result)
    }

    /// Reads and deserializes the value stored at key
    ///
    /// Returns `Ok(None)` if the key is absent. A stored value that does not
    /// deserialize into `T` is an error.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let key = self.store_key(key)?;
        let _timer = CacheMetrics::global().start_operation(OP_GET);
        let result = self
            .database
            .string_get_async(&key, CommandFlags::None)
            .await
            .and_then(|raw| decode(&key, raw));
        finish(OP_GET, &key, result)
    }

    /// Blocking form of [`get`](Self::get)
    pub fn get_blocking<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let key = self.store_key(key)?;
        let _timer = CacheMetrics::global().start_operation(OP_GET);
        let result = self
            .database
            .string_get(&key, CommandFlags::None)
            .and_then(|raw| decode(&key, raw));
        finish(OP_GET, &key, result)
    }

    /// Like [`get`](Self::get), but an absent key yields `T::default()`
    pub async fn get_or_default<T: DeserializeOwned + Default>(
        &self,
        key: &str,
    ) -> Result<T, CacheError> {
        Ok(self.get(key).await?.unwrap_or_default())
    }

    /// Blocking form of [`get_or_default`](Self::get_or_default)
    pub fn get_or_default_blocking<T: DeserializeOwned + Default>(
        &self,
        key: &str,
    ) -> Result<T, CacheError> {
        Ok(self.get_blocking(key)?.unwrap_or_default())
    }

    /// Reads the value stored at key without a static type
    pub async fn get_value(&self, key: &str) -> Result<Option<serde_json::Value>, CacheError> {
        self.get(key).await
    }

    /// Blocking form of [`get_value`](Self::get_value)
    pub fn get_value_blocking(&self, key: &str) -> Result<Option<serde_json::Value>, CacheError> {
        self.get_blocking(key)
    }

    /// Serializes the value and stores it, overwriting any existing value
    ///
    /// A `None` ttl stores the value without expiry.
    pub async fn set<T>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError>
    where
        T: Serialize + Sync + ?Sized,
    {
        let key = self.store_key(key)?;
        let _timer = CacheMetrics::global().start_operation(OP_SET);
        let result = match encode(value) {
            Ok(json) => self
                .database
                .string_set_async(&key, &json, ttl, SetCondition::Always, CommandFlags::None)
                .await
                .map(|_| ()),
            Err(e) => Err(e),
        };
        finish(OP_SET, &key, result)
    }

    /// Blocking form of [`set`](Self::set)
    pub fn set_blocking<T>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError>
    where
        T: Serialize + ?Sized,
    {
        let key = self.store_key(key)?;
        let _timer = CacheMetrics::global().start_operation(OP_SET);
        let result = encode(value).and_then(|json| {
            self.database
                .string_set(&key, &json, ttl, SetCondition::Always, CommandFlags::None)
                .map(|_| ())
        });
        finish(OP_SET, &key, result)
    }

    /// Deletes the key
    /// Returns true if a value was removed; an absent key is not an error
    pub async fn remove(&self, key: &str) -> Result<bool, CacheError> {
        let key = self.store_key(key)?;
        let _timer = CacheMetrics::global().start_operation(OP_REMOVE);
        let result = self
            .database
            .key_delete_async(&key, CommandFlags::None)
            .await;
        finish(OP_REMOVE, &key, result)
    }

    /// Blocking form of [`remove`](Self::remove)
    pub fn remove_blocking(&self, key: &str) -> Result<bool, CacheError> {
        let key = self.store_key(key)?;
        let _timer = CacheMetrics::global().start_operation(OP_REMOVE);
        let result = self.database.key_delete(&key, CommandFlags::None);
        finish(OP_REMOVE, &key, result)
    }

    /// Updates the time-to-live of a key without touching its value
    ///
    /// `None` removes any expiry. Returns false if the key does not exist, or when
    /// clearing, if it had no expiry to remove.
    pub async fn set_expiration_time(
        &self,
        key: &str,
        ttl: Option<Duration>,
    ) -> Result<bool, CacheError> {
        let key = self.store_key(key)?;
        let _timer = CacheMetrics::global().start_operation(OP_EXPIRE);
        let result = self
            .database
            .key_expire_async(&key, ttl, CommandFlags::None)
            .await;
        finish(OP_EXPIRE, &key, result)
    }

    /// Blocking form of [`set_expiration_time`](Self::set_expiration_time)
    pub fn set_expiration_time_blocking(
        &self,
        key: &str,
        ttl: Option<Duration>,
    ) -> Result<bool, CacheError> {
        let key = self.store_key(key)?;
        let _timer = CacheMetrics::global().start_operation(OP_EXPIRE);
        let result = self.database.key_expire(&key, ttl, CommandFlags::None);
        finish(OP_EXPIRE, &key, result)
    }

    fn store_key(&self, key: &str) -> Result<String, CacheError> {
        let key = format_key(self.key_prefix.as_deref(), key);
        validate_key(&key).map_err(CacheError::InvalidKey)?;
        Ok(key)
    }
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, CacheError> {
    Ok(serde_json::to_string(value)?)
}

fn decode<T: DeserializeOwned>(key: &str, raw: Option<String>) -> Result<Option<T>, CacheError> {
    CacheMetrics::global().record_lookup(raw.is_some());
    match raw {
        Some(json) => serde_json::from_str(&json).map(Some).map_err(|e| {
            CacheError::Serialization(format!("Failed to deserialize value at '{}': {}", key, e))
        }),
        None => Ok(None),
    }
}

fn finish<T>(
    operation: &'static str,
    key: &str,
    result: Result<T, CacheError>,
) -> Result<T, CacheError> {
    match &result {
        Ok(_) => tracing::debug!(operation, key, "cache operation completed"),
        Err(e) => {
            CacheMetrics::global().errors.inc();
            tracing::warn!(operation, key, error = %e, "cache operation failed");
        }
    }
    result
}
