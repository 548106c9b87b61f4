// Redis store module
//
// Provides the production `Database` implementation over the redis crate.

pub mod config;
pub mod database;

pub use config::RedisConfig;
pub use database::RedisDatabase;

use super::adapter::RedisCache;
use super::error::CacheError;

impl RedisCache<RedisDatabase> {
    /// Connects to Redis and wraps the connection in a cache adapter
    pub async fn connect(config: &RedisConfig) -> Result<Self, CacheError> {
        Ok(RedisCache::new(RedisDatabase::connect(config).await?))
    }
}
