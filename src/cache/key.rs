// Cache key formatting and validation

/// Redis rejects keys larger than 512MB
pub const MAX_KEY_BYTES: usize = 512 * 1024 * 1024;

/// Formats a store key from an optional prefix and the caller's key
///
/// # Format
/// - With prefix: "{prefix}:{key}"
/// - Without prefix: "{key}" unchanged
pub fn format_key(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, key),
        _ => key.to_string(),
    }
}

/// Validates a store key before store operations
///
/// Keys are binary-safe; only the Redis size limit (512MB) is enforced.
pub fn validate_key(key: &str) -> Result<(), String> {
    if key.len() > MAX_KEY_BYTES {
        return Err("Key exceeds Redis limit of 512MB".to_string());
    }

    Ok(())
}

/// Validates a configured key prefix
///
/// # Errors
/// Returns error message if:
/// - Prefix contains null bytes
/// - Prefix exceeds Redis limits (512MB)
pub fn validate_prefix(prefix: &str) -> Result<(), String> {
    if prefix.contains('\0') {
        return Err("Prefix contains null bytes".to_string());
    }

    validate_key(prefix)
}
