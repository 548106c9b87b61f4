//! Cache error types
//!
//! This module defines error types for cache operations.

use std::time::Duration;

/// Cache error types
#[derive(Debug)]
pub enum CacheError {
    /// Key rejected before reaching the store
    InvalidKey(String),
    /// Serialization/deserialization error
    Serialization(String),
    /// Redis connection failed
    RedisConnectionFailed(String),
    /// Redis command error
    Redis(String),
    /// Store call did not complete in time
    Timeout(Duration),
    /// Configuration error
    Configuration(String),
}

impl std::fmt::Display for CacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheError::InvalidKey(msg) => write!(f, "Invalid cache key: {}", msg),
            CacheError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            CacheError::RedisConnectionFailed(msg) => write!(f, "Redis connection failed: {}", msg),
            CacheError::Redis(msg) => write!(f, "Redis error: {}", msg),
            CacheError::Timeout(after) => {
                write!(f, "Operation timed out after {}ms", after.as_millis())
            }
            CacheError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for CacheError {}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serialization(err.to_string())
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::Redis(err.to_string())
    }
}
