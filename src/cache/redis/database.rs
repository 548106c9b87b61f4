// Redis store handle
//
// Async primitives go through a multiplexed ConnectionManager (reconnects on
// its own); blocking primitives share one lazily opened connection.

use async_trait::async_trait;
use parking_lot::Mutex;
use redis::aio::ConnectionManager;
use redis::{Client, Cmd, Connection, FromRedisValue};
use std::time::Duration;

use super::config::RedisConfig;
use crate::cache::{CacheError, CommandFlags, Database, SetCondition};

/// `Database` implementation backed by a Redis server
pub struct RedisDatabase {
    client: Client,

    /// Redis connection manager (async, multiplexed)
    manager: ConnectionManager,

    /// Connection for blocking calls, opened on first use
    connection: Mutex<Option<Connection>>,

    connection_timeout: Duration,
    operation_timeout: Duration,
}

impl RedisDatabase {
    /// Connects to the Redis server described by `config`
    ///
    /// # Errors
    ///
    /// Returns CacheError::Configuration if redis_url is missing, and
    /// CacheError::RedisConnectionFailed if:
    /// - Redis URL is invalid
    /// - Cannot connect to Redis server within the connection timeout
    /// - Authentication fails
    pub async fn connect(config: &RedisConfig) -> Result<Self, CacheError> {
        let url = config.connection_url()?;

        let client = Client::open(url.as_str()).map_err(|e| {
            CacheError::RedisConnectionFailed(format!("Invalid Redis URL: {}", e))
        })?;

        let connection_timeout = config.connection_timeout();
        let manager = ConnectionManager::new(client.clone());
        let manager = tokio::time::timeout(connection_timeout, manager)
            .await
            .map_err(|_| {
                CacheError::RedisConnectionFailed(format!(
                    "Timed out after {}ms connecting to Redis",
                    connection_timeout.as_millis()
                ))
            })?
            .map_err(|e| {
                CacheError::RedisConnectionFailed(format!("Failed to connect to Redis: {}", e))
            })?;

        tracing::info!(
            redis_db = config.redis_db,
            connection_timeout_ms = config.connection_timeout_ms,
            operation_timeout_ms = config.operation_timeout_ms,
            "Connected to Redis"
        );

        Ok(Self {
            client,
            manager,
            connection: Mutex::new(None),
            connection_timeout,
            operation_timeout: config.operation_timeout(),
        })
    }

    /// Returns a handle to the multiplexed async connection
    ///
    /// Use this for commands the cache adapter does not expose.
    pub fn connection_manager(&self) -> ConnectionManager {
        self.manager.clone()
    }

    /// Sends a PING command to verify Redis is responsive
    pub async fn health_check(&self) -> bool {
        match self
            .query_async::<String>(redis::cmd("PING"), CommandFlags::None)
            .await
        {
            Ok(reply) => reply == "PONG",
            Err(e) => {
                tracing::warn!(error = %e, "Redis health check failed");
                false
            }
        }
    }

    async fn query_async<T>(&self, cmd: Cmd, flags: CommandFlags) -> Result<T, CacheError>
    where
        T: FromRedisValue + Default + Send,
    {
        let mut conn = self.manager.clone();

        if flags == CommandFlags::FireAndForget {
            let operation_timeout = self.operation_timeout;
            tokio::spawn(async move {
                let reply = tokio::time::timeout(operation_timeout, async move {
                    let result: redis::RedisResult<redis::Value> =
                        cmd.query_async(&mut conn).await;
                    result
                })
                .await;
                match reply {
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => {
                        tracing::warn!(error = %e, "Fire-and-forget Redis command failed")
                    }
                    Err(_) => tracing::warn!(
                        timeout_ms = operation_timeout.as_millis() as u64,
                        "Fire-and-forget Redis command timed out"
                    ),
                }
            });
            return Ok(T::default());
        }

        let reply = tokio::time::timeout(self.operation_timeout, cmd.query_async(&mut conn)).await;
        match reply {
            Ok(result) => result.map_err(CacheError::from),
            Err(_) => Err(CacheError::Timeout(self.operation_timeout)),
        }
    }

    fn query<T>(&self, cmd: Cmd, flags: CommandFlags) -> Result<T, CacheError>
    where
        T: FromRedisValue + Default,
    {
        let mut guard = self.connection.lock();
        let conn = match guard.take() {
            Some(conn) => conn,
            None => self.open_connection()?,
        };
        let conn = guard.insert(conn);

        // The reply is still read so the next command on this connection
        // does not receive it
        let result: redis::RedisResult<T> = if flags == CommandFlags::FireAndForget {
            let reply: redis::RedisResult<redis::Value> = cmd.query(conn);
            reply.map(|_| T::default())
        } else {
            cmd.query(conn)
        };

        result.map_err(|e| {
            // Drop a broken connection; the next call reconnects
            if e.is_io_error() || e.is_connection_dropped() || e.is_timeout() {
                *guard = None;
            }
            if e.is_timeout() {
                CacheError::Timeout(self.operation_timeout)
            } else {
                CacheError::from(e)
            }
        })
    }

    fn open_connection(&self) -> Result<Connection, CacheError> {
        let conn = self
            .client
            .get_connection_with_timeout(self.connection_timeout)
            .map_err(|e| {
                CacheError::RedisConnectionFailed(format!("Failed to connect to Redis: {}", e))
            })?;
        conn.set_read_timeout(Some(self.operation_timeout))?;
        conn.set_write_timeout(Some(self.operation_timeout))?;
        tracing::debug!("Opened blocking Redis connection");
        Ok(conn)
    }
}

/// Millisecond ttl for PX / PEXPIRE; sub-millisecond ttls round up to 1ms
fn ttl_millis(ttl: Duration) -> u64 {
    if ttl.is_zero() {
        return 0;
    }
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

fn exists_cmd(key: &str) -> Cmd {
    let mut cmd = redis::cmd("EXISTS");
    cmd.arg(key);
    cmd
}

fn get_cmd(key: &str) -> Cmd {
    let mut cmd = redis::cmd("GET");
    cmd.arg(key);
    cmd
}

fn set_cmd(key: &str, value: &str, ttl: Option<Duration>, condition: SetCondition) -> Cmd {
    let mut cmd = redis::cmd("SET");
    cmd.arg(key).arg(value);
    if let Some(ttl) = ttl {
        cmd.arg("PX").arg(ttl_millis(ttl));
    }
    match condition {
        SetCondition::Always => {}
        SetCondition::IfExists => {
            cmd.arg("XX");
        }
        SetCondition::IfNotExists => {
            cmd.arg("NX");
        }
    }
    cmd
}

fn del_cmd(key: &str) -> Cmd {
    let mut cmd = redis::cmd("DEL");
    cmd.arg(key);
    cmd
}

fn expire_cmd(key: &str, ttl: Option<Duration>) -> Cmd {
    match ttl {
        Some(ttl) => {
            let mut cmd = redis::cmd("PEXPIRE");
            cmd.arg(key).arg(ttl_millis(ttl));
            cmd
        }
        None => {
            let mut cmd = redis::cmd("PERSIST");
            cmd.arg(key);
            cmd
        }
    }
}

#[async_trait]
impl Database for RedisDatabase {
    fn key_exists(&self, key: &str, flags: CommandFlags) -> Result<bool, CacheError> {
        self.query(exists_cmd(key), flags)
    }

    fn string_get(&self, key: &str, flags: CommandFlags) -> Result<Option<String>, CacheError> {
        self.query(get_cmd(key), flags)
    }

    fn string_set(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
        condition: SetCondition,
        flags: CommandFlags,
    ) -> Result<bool, CacheError> {
        // SET replies OK, or nil when NX/XX blocked the write
        let reply: Option<String> = self.query(set_cmd(key, value, ttl, condition), flags)?;
        Ok(reply.is_some())
    }

    fn key_delete(&self, key: &str, flags: CommandFlags) -> Result<bool, CacheError> {
        self.query(del_cmd(key), flags)
    }

    fn key_expire(
        &self,
        key: &str,
        ttl: Option<Duration>,
        flags: CommandFlags,
    ) -> Result<bool, CacheError> {
        self.query(expire_cmd(key, ttl), flags)
    }

    async fn key_exists_async(&self, key: &str, flags: CommandFlags) -> Result<bool, CacheError> {
        self.query_async(exists_cmd(key), flags).await
    }

    async fn string_get_async(
        &self,
        key: &str,
        flags: CommandFlags,
    ) -> Result<Option<String>, CacheError> {
        self.query_async(get_cmd(key), flags).await
    }

    async fn string_set_async(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
        condition: SetCondition,
        flags: CommandFlags,
    ) -> Result<bool, CacheError> {
        let reply: Option<String> = self
            .query_async(set_cmd(key, value, ttl, condition), flags)
            .await?;
        Ok(reply.is_some())
    }

    async fn key_delete_async(&self, key: &str, flags: CommandFlags) -> Result<bool, CacheError> {
        self.query_async(del_cmd(key), flags).await
    }

    async fn key_expire_async(
        &self,
        key: &str,
        ttl: Option<Duration>,
        flags: CommandFlags,
    ) -> Result<bool, CacheError> {
        self.query_async(expire_cmd(key, ttl), flags).await
    }
}
