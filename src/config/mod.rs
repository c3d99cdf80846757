//! Configuration loading and management
//!
//! [`RemoteConfig`] carries the connection settings for the hosted backend.
//! It loads from a YAML file or from the environment; credentials never
//! live in code.

use crate::core::error::{RemoteError, ValidationError};
use serde::{Deserialize, Serialize};

/// Environment variable holding the backend base URL
pub const ENV_URL: &str = "STAYSYNC_REMOTE_URL";
/// Environment variable holding the backend API key
pub const ENV_API_KEY: &str = "STAYSYNC_REMOTE_KEY";
/// Environment variable holding the optional schema name
pub const ENV_SCHEMA: &str = "STAYSYNC_REMOTE_SCHEMA";

/// Connection settings for the remote data store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the backend (e.g. "https://xyz.example.co")
    pub url: String,

    /// API key sent as both `apikey` and bearer token
    pub api_key: String,

    /// Optional schema profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

impl RemoteConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self, RemoteError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RemoteError::message(format!("failed to read '{}': {}", path, e)))?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, RemoteError> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| RemoteError::message(format!("invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the environment
    pub fn from_env() -> Result<Self, RemoteError> {
        let url = std::env::var(ENV_URL)
            .map_err(|_| RemoteError::message(format!("{} is not set", ENV_URL)))?;
        let api_key = std::env::var(ENV_API_KEY)
            .map_err(|_| RemoteError::message(format!("{} is not set", ENV_API_KEY)))?;
        let config = Self {
            url,
            api_key,
            schema: std::env::var(ENV_SCHEMA).ok(),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), RemoteError> {
        let check = |field: &str, value: &str| -> Result<(), RemoteError> {
            crate::core::validation::non_empty(field, value)
                .map_err(|ValidationError { field, message }| {
                    RemoteError::message(format!("config field '{}' {}", field, message))
                })
        };
        check("url", &self.url)?;
        check("api_key", &self.api_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_roundtrip() {
        let config = RemoteConfig {
            url: "https://example.test".to_string(),
            api_key: "anon".to_string(),
            schema: Some("public".to_string()),
        };
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed = RemoteConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed.url, config.url);
        assert_eq!(parsed.schema.as_deref(), Some("public"));
    }

    #[test]
    fn test_yaml_without_schema() {
        let parsed =
            RemoteConfig::from_yaml_str("url: https://example.test\napi_key: anon\n").unwrap();
        assert!(parsed.schema.is_none());
    }

    #[test]
    fn test_blank_url_is_rejected() {
        let err = RemoteConfig::from_yaml_str("url: \"\"\napi_key: anon\n").unwrap_err();
        assert!(err.message.contains("url"));
    }

    #[test]
    fn test_invalid_yaml_is_rejected() {
        assert!(RemoteConfig::from_yaml_str(": not yaml").is_err());
    }
}
