// redis-json-cache library
//
// Typed JSON cache adapter over Redis and Redis-compatible stores.

pub mod cache;
pub mod config;
pub mod logging;

pub use cache::{
    CacheError, CommandFlags, Database, MemoryDatabase, RedisCache, RedisConfig, RedisDatabase,
    SetCondition,
};
