//! Backing store trait definition
//!
//! This module defines the `Database` trait that every key-value store handle
//! must satisfy before it can sit behind a [`RedisCache`](super::RedisCache).
//! The primitives mirror the Redis string and key commands the adapter needs,
//! each in a blocking and an async form.

use async_trait::async_trait;
use std::time::Duration;

use super::error::CacheError;

/// Per-command flags forwarded to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandFlags {
    /// Wait for the store's reply
    #[default]
    None,
    /// Return default results instead of the store's reply
    ///
    /// Async calls return immediately while the command runs in the
    /// background, bounded by the store's operation timeout. Blocking calls
    /// still wait for the reply and discard it.
    FireAndForget,
}

/// Condition attached to a string write (SET NX / XX)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetCondition {
    /// Write unconditionally
    #[default]
    Always,
    /// Write only when the key already exists (XX)
    IfExists,
    /// Write only when the key does not exist (NX)
    IfNotExists,
}

/// Key-value store handle used by the cache adapter
///
/// Implementations must be safe for concurrent use; the adapter shares one
/// handle between all callers and adds no locking of its own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Database: Send + Sync {
    /// Returns true if the key exists
    fn key_exists(&self, key: &str, flags: CommandFlags) -> Result<bool, CacheError>;

    /// Returns the string stored at key, or None if absent
    fn string_get(&self, key: &str, flags: CommandFlags) -> Result<Option<String>, CacheError>;

    /// Stores a string at key with an optional time-to-live
    /// Returns false if the condition prevented the write
    fn string_set(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
        condition: SetCondition,
        flags: CommandFlags,
    ) -> Result<bool, CacheError>;

    /// Deletes the key
    /// Returns true if a key was removed
    fn key_delete(&self, key: &str, flags: CommandFlags) -> Result<bool, CacheError>;

    /// Sets (Some) or clears (None) the time-to-live of an existing key
    /// Returns false if the key does not exist, or when clearing, if it had no ttl
    fn key_expire(
        &self,
        key: &str,
        ttl: Option<Duration>,
        flags: CommandFlags,
    ) -> Result<bool, CacheError>;

    async fn key_exists_async(&self, key: &str, flags: CommandFlags) -> Result<bool, CacheError>;

    async fn string_get_async(
        &self,
        key: &str,
        flags: CommandFlags,
    ) -> Result<Option<String>, CacheError>;

    async fn string_set_async(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
        condition: SetCondition,
        flags: CommandFlags,
    ) -> Result<bool, CacheError>;

    async fn key_delete_async(&self, key: &str, flags: CommandFlags) -> Result<bool, CacheError>;

    async fn key_expire_async(
        &self,
        key: &str,
        ttl: Option<Duration>,
        flags: CommandFlags,
    ) -> Result<bool, CacheError>;
}
