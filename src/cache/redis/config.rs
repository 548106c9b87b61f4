// Redis connection configuration module

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::cache::CacheError;

/// Redis-specific connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Optional password for Redis authentication
    /// Ignored when the URL already carries credentials
    #[serde(default)]
    pub redis_password: Option<String>,

    /// Redis database number (default: 0)
    /// Ignored when the URL already selects a database
    #[serde(default = "default_redis_db")]
    pub redis_db: u32,

    /// Connection timeout in milliseconds (default: 5000 = 5 seconds)
    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,

    /// Operation timeout in milliseconds (default: 2000 = 2 seconds)
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            redis_password: None,
            redis_db: default_redis_db(),
            connection_timeout_ms: default_connection_timeout_ms(),
            operation_timeout_ms: default_operation_timeout_ms(),
        }
    }
}

fn default_redis_db() -> u32 {
    0
}

fn default_connection_timeout_ms() -> u64 {
    5000 // 5 seconds
}

fn default_operation_timeout_ms() -> u64 {
    2000 // 2 seconds
}

impl RedisConfig {
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    /// Builds the URL handed to the redis client
    ///
    /// Password and database number are folded into TCP URLs
    /// ("redis://" / "rediss://") that do not already specify them.
    /// Other URLs are returned unchanged.
    pub fn connection_url(&self) -> Result<String, CacheError> {
        let url = self
            .redis_url
            .as_deref()
            .ok_or_else(|| CacheError::Configuration("redis_url is required".to_string()))?;

        let Some((scheme, rest)) = url.split_once("://") else {
            return Ok(url.to_string());
        };
        if scheme != "redis" && scheme != "rediss" {
            return Ok(url.to_string());
        }

        let (authority, path) = match rest.find('/') {
            Some(idx) => rest.split_at(idx),
            None => (rest, ""),
        };

        let authority = match &self.redis_password {
            Some(password) if !authority.contains('@') => {
                format!(":{}@{}", urlencoding::encode(password), authority)
            }
            _ => authority.to_string(),
        };

        let path = if self.redis_db != 0 && path.trim_start_matches('/').is_empty() {
            format!("/{}", self.redis_db)
        } else {
            path.to_string()
        };

        Ok(format!("{}://{}{}", scheme, authority, path))
    }

    /// Validate connection settings
    pub fn validate(&self) -> Result<(), String> {
        match &self.redis_url {
            Some(url) if url.trim().is_empty() => {
                return Err("redis_url cannot be empty".to_string())
            }
            None => return Err("redis_url is required".to_string()),
            _ => {}
        }
        if self.connection_timeout_ms == 0 {
            return Err("connection_timeout_ms must be greater than 0".to_string());
        }
        if self.operation_timeout_ms == 0 {
            return Err("operation_timeout_ms must be greater than 0".to_string());
        }
        Ok(())
    }
}
