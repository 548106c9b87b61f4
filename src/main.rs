use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use redis_json_cache::config::Config;
use redis_json_cache::{RedisCache, RedisDatabase};
use std::path::PathBuf;
use std::time::Duration;

/// Inspect and edit JSON values cached in Redis
#[derive(Parser, Debug)]
#[command(name = "redis-json-cache")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Redis URL (overrides redis.redis_url from the config file)
    #[arg(short, long)]
    url: Option<String>,

    /// Key prefix (overrides cache.key_prefix from the config file)
    #[arg(short, long)]
    prefix: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check whether a key exists
    Exists { key: String },
    /// Print the JSON value stored at a key
    Get { key: String },
    /// Store a JSON value at a key
    Set {
        key: String,
        /// JSON document to store
        value: String,
        /// Time-to-live in seconds (no expiry if omitted)
        #[arg(long)]
        ttl: Option<u64>,
    },
    /// Delete a key
    Remove { key: String },
    /// Change the time-to-live of a key
    Expire {
        key: String,
        /// New time-to-live in seconds
        #[arg(long, conflicts_with = "persist", required_unless_present = "persist")]
        ttl: Option<u64>,
        /// Remove the time-to-live instead
        #[arg(long)]
        persist: bool,
    },
    /// Check that Redis responds
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(url) = args.url {
        config.redis.redis_url = Some(url);
    }
    if let Some(prefix) = args.prefix {
        config.cache.key_prefix = Some(prefix);
    }

    redis_json_cache::logging::init_subscriber(&config.logging)?;
    config.validate()?;

    let database = RedisDatabase::connect(&config.redis).await?;
    let cache = config.cache.apply(RedisCache::new(database));

    tracing::debug!(
        key_prefix = ?cache.key_prefix(),
        command = ?args.command,
        "Running command"
    );

    match args.command {
        Command::Exists { key } => {
            println!("{}", cache.exists(&key).await?);
        }
        Command::Get { key } => match cache.get_value(&key).await? {
            Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
            None => println!("(nil)"),
        },
        Command::Set { key, value, ttl } => {
            let value: serde_json::Value =
                serde_json::from_str(&value).context("Value is not valid JSON")?;
            cache.set(&key, &value, ttl.map(Duration::from_secs)).await?;
            println!("OK");
        }
        Command::Remove { key } => {
            println!("{}", cache.remove(&key).await?);
        }
        Command::Expire { key, ttl, persist } => {
            let ttl = if persist {
                None
            } else {
                ttl.map(Duration::from_secs)
            };
            println!("{}", cache.set_expiration_time(&key, ttl).await?);
        }
        Command::Ping => {
            if !cache.database().health_check().await {
                bail!("Redis did not answer PING");
            }
            println!("PONG");
        }
    }

    Ok(())
}
