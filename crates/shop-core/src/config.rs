//! Backend and client configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Environment variable overriding `base_url`.
pub const ENV_API_URL: &str = "SHOP_API_URL";
/// Environment variable overriding `token`.
pub const ENV_API_TOKEN: &str = "SHOP_API_TOKEN";

/// Errors raised while loading or saving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Configuration for talking to the storefront backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    /// Base URL of the REST API (e.g., "https://api.example.com").
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// ISO currency code used for all cart amounts.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Total timeout for a single request, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Retry budget for idempotent reads.
    #[serde(default = "default_read_retries")]
    pub read_retries: u32,

    /// Bearer token of the signed-in user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// ID of the signed-in user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Persisted guest identifier for anonymous carts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_id: Option<String>,

    /// Logging options.
    #[serde(default)]
    pub log: LogConfig,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_currency() -> String {
    "TRY".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_read_retries() -> u32 {
    1
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            currency: default_currency(),
            timeout_ms: default_timeout_ms(),
            read_retries: default_read_retries(),
            token: None,
            user_id: None,
            guest_id: None,
            log: LogConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Create a config pointing at the given backend.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Load config from a TOML or JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        Self::parse(&content, is_json(path)).map_err(|message| ConfigError::Parse {
            path: display,
            message,
        })
    }

    /// Parse config text.
    pub fn parse(content: &str, json: bool) -> Result<Self, String> {
        if json {
            serde_json::from_str(content).map_err(|e| e.to_string())
        } else {
            toml::from_str(content).map_err(|e| e.to_string())
        }
    }

    /// Save config to a TOML or JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = if is_json(path) {
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        };

        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        })
    }

    /// Apply `SHOP_API_URL` / `SHOP_API_TOKEN` overrides.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var(ENV_API_URL).ok(),
            std::env::var(ENV_API_TOKEN).ok(),
        )
    }

    /// Apply explicit overrides; empty values are ignored.
    pub fn with_overrides(mut self, base_url: Option<String>, token: Option<String>) -> Self {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url;
        }
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.token = Some(token);
        }
        self
    }

    /// Check the config for values the client cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "base_url must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeout_ms must be positive".to_string()));
        }
        if self.token.is_some() && self.user_id.is_none() {
            return Err(ConfigError::Invalid(
                "user_id is required when token is set".to_string(),
            ));
        }
        Ok(())
    }

    /// Request timeout as a duration.
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_ms)
    }
}

/// Logging options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogConfig {
    /// Output format: "json" or "human".
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Minimum level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
            level: default_log_level(),
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().map_or(false, |e| e == "json")
}

/// Generate a default shop.toml config file.
pub fn generate_default_config(base_url: &str) -> String {
    format!(
        r#"# Storefront cart client configuration

base_url = "{base_url}"
currency = "TRY"
timeout_ms = 10000
read_retries = 1

# Signed-in user (leave unset to shop as a guest)
# token = "..."
# user_id = "..."

[log]
format = "human"
level = "info"
"#,
        base_url = base_url
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.currency, "TRY");
        assert_eq!(config.timeout_ms, 10_000);
        assert_eq!(config.read_retries, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml_with_defaults() {
        let config = ApiConfig::parse("base_url = \"https://api.shop.test\"", false).unwrap();
        assert_eq!(config.base_url, "https://api.shop.test");
        assert_eq!(config.timeout_ms, 10_000);
        assert_eq!(config.log.format, "json");
    }

    #[test]
    fn test_parse_json() {
        let config =
            ApiConfig::parse(r#"{"base_url": "https://x.test", "timeout_ms": 2500}"#, true).unwrap();
        assert_eq!(config.timeout(), std::time::Duration::from_millis(2500));
    }

    #[test]
    fn test_generated_config_parses() {
        let text = generate_default_config("https://api.shop.test");
        let config = ApiConfig::parse(&text, false).unwrap();
        assert_eq!(config.base_url, "https://api.shop.test");
        assert_eq!(config.log.format, "human");
    }

    #[test]
    fn test_overrides_ignore_empty_values() {
        let config = ApiConfig::default()
            .with_overrides(Some("https://other.test".to_string()), Some(" ".to_string()));
        assert_eq!(config.base_url, "https://other.test");
        assert!(config.token.is_none());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = ApiConfig::new("ftp://nope");
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_requires_user_for_token() {
        let mut config = ApiConfig::default();
        config.token = Some("abc".to_string());
        assert!(config.validate().is_err());
        config.user_id = Some("u-1".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load_roundtrip_file() {
        let dir = std::env::temp_dir().join(format!("shop-core-{}", rand::random::<u32>()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("shop.toml");

        let mut config = ApiConfig::new("https://api.shop.test");
        config.guest_id = Some("guest_abc".to_string());
        config.save(&path).unwrap();

        let loaded = ApiConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
