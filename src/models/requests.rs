//! Request DTOs for the proxy API
//!
//! Defines the structure of incoming query parameters.

use serde::Deserialize;

use crate::cache::MAX_KEY_LENGTH;

/// Query string of the lookup operation (GET /lookup?key=...)
///
/// `key` is optional here so a missing parameter reaches the handler and is
/// answered with the proxy's own 400 body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LookupQuery {
    /// The key to look up
    #[serde(default)]
    pub key: Option<String>,
}

impl LookupQuery {
    /// Returns the key if it is usable, or an error message.
    pub fn validate(&self) -> Result<&str, String> {
        let key = self
            .key
            .as_deref()
            .ok_or_else(|| "Missing 'key' query parameter".to_string())?;
        if key.is_empty() {
            return Err("Key cannot be empty".to_string());
        }
        if key.len() > MAX_KEY_LENGTH {
            return Err(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            ));
        }
        Ok(key)
    }
}
