// Configuration module

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cache::{CacheConfig, RedisConfig};
use crate::logging::LoggingConfig;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable '{0}' is referenced but not set")]
    MissingEnvVar(String),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl Config {
    /// Parses YAML, replacing `${VAR_NAME}` with environment variable values
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, ConfigError> {
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let mut missing = None;
        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    missing.get_or_insert_with(|| var_name.to_string());
                    String::new()
                }
            }
        });
        if let Some(var_name) = missing {
            return Err(ConfigError::MissingEnvVar(var_name));
        }

        Ok(serde_yaml::from_str(&substituted)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_with_env(&yaml)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.redis.validate().map_err(ConfigError::Invalid)?;
        self.cache.validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogFormat;
    use std::io::Write;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = Config::from_yaml_with_env("{}").unwrap();
        assert!(config.redis.redis_url.is_none());
        assert!(config.cache.key_prefix.is_none());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_full_config_parses() {
        let yaml = r#"
redis:
  redis_url: "redis://localhost:6379"
  redis_db: 2
  operation_timeout_ms: 500
cache:
  key_prefix: "myapp"
logging:
  level: debug
  format: json
"#;
        let config = Config::from_yaml_with_env(yaml).unwrap();
        assert_eq!(
            config.redis.redis_url.as_deref(),
            Some("redis://localhost:6379")
        );
        assert_eq!(config.redis.redis_db, 2);
        assert_eq!(config.redis.operation_timeout_ms, 500);
        assert_eq!(config.redis.connection_timeout_ms, 5000);
        assert_eq!(config.cache.key_prefix.as_deref(), Some("myapp"));
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_can_substitute_env_var_in_redis_password() {
        std::env::set_var("REDIS_JSON_CACHE_TEST_PASSWORD", "s3cret");
        let yaml = r#"
redis:
  redis_url: "redis://localhost:6379"
  redis_password: ${REDIS_JSON_CACHE_TEST_PASSWORD}
"#;
        let config = Config::from_yaml_with_env(yaml).unwrap();
        assert_eq!(config.redis.redis_password.as_deref(), Some("s3cret"));
        std::env::remove_var("REDIS_JSON_CACHE_TEST_PASSWORD");
    }

    #[test]
    fn test_missing_env_var_is_an_error() {
        let yaml = r#"
redis:
  redis_url: ${REDIS_JSON_CACHE_TEST_UNSET_VARIABLE}
"#;
        match Config::from_yaml_with_env(yaml) {
            Err(ConfigError::MissingEnvVar(name)) => {
                assert_eq!(name, "REDIS_JSON_CACHE_TEST_UNSET_VARIABLE")
            }
            other => panic!("Expected MissingEnvVar, got: {:?}", other),
        }
    }

    #[test]
    fn test_literal_values_are_not_substituted() {
        let yaml = r#"
redis:
  redis_password: literal-$password
"#;
        let config = Config::from_yaml_with_env(yaml).unwrap();
        assert_eq!(
            config.redis.redis_password.as_deref(),
            Some("literal-$password")
        );
    }

    #[test]
    fn test_invalid_yaml_is_parse_error() {
        let result = Config::from_yaml_with_env("redis: [unclosed");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validate_requires_redis_url() {
        let config = Config::default();
        match config.validate() {
            Err(ConfigError::Invalid(msg)) => assert!(msg.contains("redis_url")),
            other => panic!("Expected Invalid, got: {:?}", other),
        }
    }

    #[test]
    fn test_from_file_reads_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "redis:\n  redis_url: \"redis://127.0.0.1:6379\"").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(
            config.redis.redis_url.as_deref(),
            Some("redis://127.0.0.1:6379")
        );
    }

    #[test]
    fn test_from_file_missing_file_is_io_error() {
        let result = Config::from_file("/nonexistent/redis-json-cache.yaml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
