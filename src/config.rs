//! Configuration management for jlpt-edge.

use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use tracing::info;

use crate::error::{EdgeError, Result};
use crate::i18n::{Language, DEFAULT_LANGUAGE};
use crate::request::DEFAULT_MAX_MESSAGE_CHARS;

/// Prefix for environment overrides, e.g. `JLPT_EDGE__SERVER__GRPC_ADDR`.
pub const ENV_PREFIX: &str = "JLPT_EDGE";

/// Main configuration for the edge service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EdgeConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Landing chat rate limiting configuration
    #[serde(default)]
    pub rate_limiting: RateLimitingConfig,

    /// URL localization configuration
    #[serde(default)]
    pub localization: LocalizationConfig,

    /// Log output configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// gRPC server address
    #[serde(default = "default_grpc_addr")]
    pub grpc_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            grpc_addr: default_grpc_addr(),
        }
    }
}

fn default_grpc_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, 8081))
}

/// Rate limiting configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitingConfig {
    /// Messages accepted per window
    #[serde(default = "default_message_limit")]
    pub message_limit: u32,

    /// Characters accepted per window
    #[serde(default = "default_character_limit")]
    pub character_limit: u64,

    /// Counting window in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Block imposed on a violation, in seconds
    #[serde(default = "default_block_duration_secs")]
    pub block_duration_secs: u64,

    /// Interval between sweeps of idle entries, in seconds
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,

    /// Inbound messages are truncated to this many characters
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,
}

impl Default for RateLimitingConfig {
    fn default() -> Self {
        Self {
            message_limit: default_message_limit(),
            character_limit: default_character_limit(),
            window_secs: default_window_secs(),
            block_duration_secs: default_block_duration_secs(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
            max_message_chars: default_max_message_chars(),
        }
    }
}

fn default_message_limit() -> u32 {
    5
}

fn default_character_limit() -> u64 {
    2000
}

fn default_window_secs() -> u64 {
    60
}

fn default_block_duration_secs() -> u64 {
    30 * 60
}

fn default_cleanup_interval_secs() -> u64 {
    5 * 60
}

fn default_max_message_chars() -> usize {
    DEFAULT_MAX_MESSAGE_CHARS
}

/// URL localization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalizationConfig {
    /// Absolute site URL used for hreflang links
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Language assumed when a path carries none
    #[serde(default)]
    pub default_language: Language,
}

impl Default for LocalizationConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_language: DEFAULT_LANGUAGE,
        }
    }
}

fn default_base_url() -> String {
    "https://jlpt4you.com".to_string()
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Log configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Output format
    #[serde(default)]
    pub format: LogFormat,

    /// Filter directive used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl EdgeConfig {
    /// Load configuration from an optional YAML file, then apply
    /// `JLPT_EDGE__*` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            info!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config: EdgeConfig = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: EdgeConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make the limiter or links meaningless.
    pub fn validate(&self) -> Result<()> {
        let limits = &self.rate_limiting;
        let checks = [
            (limits.message_limit == 0, "rate_limiting.message_limit must be positive"),
            (limits.character_limit == 0, "rate_limiting.character_limit must be positive"),
            (limits.window_secs == 0, "rate_limiting.window_secs must be positive"),
            (limits.block_duration_secs == 0, "rate_limiting.block_duration_secs must be positive"),
            (limits.cleanup_interval_secs == 0, "rate_limiting.cleanup_interval_secs must be positive"),
            (limits.max_message_chars == 0, "rate_limiting.max_message_chars must be positive"),
        ];
        if let Some((_, message)) = checks.iter().find(|(failed, _)| *failed) {
            return Err(EdgeError::Config(message.to_string()));
        }

        let base_url = &self.localization.base_url;
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(EdgeError::Config(format!(
                "localization.base_url must be an absolute http(s) URL, got {base_url:?}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EdgeConfig::default();
        assert_eq!(config.server.grpc_addr.to_string(), "127.0.0.1:8081");
        assert_eq!(config.rate_limiting.message_limit, 5);
        assert_eq!(config.rate_limiting.character_limit, 2000);
        assert_eq!(config.rate_limiting.block_duration_secs, 1800);
        assert_eq!(config.rate_limiting.max_message_chars, 1000);
        assert_eq!(config.localization.default_language, Language::Vn);
        assert_eq!(config.logging.format, LogFormat::Text);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
server:
  grpc_addr: 0.0.0.0:9000
rate_limiting:
  message_limit: 10
localization:
  base_url: https://staging.jlpt4you.com
  default_language: en
logging:
  format: json
"#;
        let config = EdgeConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.server.grpc_addr.port(), 9000);
        assert_eq!(config.rate_limiting.message_limit, 10);
        assert_eq!(config.rate_limiting.window_secs, 60);
        assert_eq!(config.localization.default_language, Language::En);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = EdgeConfig::from_yaml("{}").unwrap();
        assert_eq!(config.rate_limiting, RateLimitingConfig::default());
    }

    #[test]
    fn test_zero_limit_rejected() {
        let yaml = "rate_limiting:\n  message_limit: 0\n";
        let err = EdgeConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, EdgeError::Config(msg) if msg.contains("message_limit")));
    }

    #[test]
    fn test_relative_base_url_rejected() {
        let yaml = "localization:\n  base_url: jlpt4you.com\n";
        assert!(matches!(EdgeConfig::from_yaml(yaml), Err(EdgeError::Config(_))));
    }

    #[test]
    fn test_unknown_language_rejected() {
        let yaml = "localization:\n  default_language: fr\n";
        assert!(matches!(EdgeConfig::from_yaml(yaml), Err(EdgeError::Config(_))));
    }

    // Environment variables are process-wide, so every `load` assertion
    // lives in this one test.
    #[test]
    fn test_load_with_env_overrides() {
        let config = tokio_test::assert_ok!(EdgeConfig::load(None));
        assert_eq!(config.rate_limiting.message_limit, 5);
        assert_eq!(config.localization.default_language, Language::Vn);

        let overrides = [
            ("JLPT_EDGE__RATE_LIMITING__MESSAGE_LIMIT", "9"),
            ("JLPT_EDGE__LOCALIZATION__DEFAULT_LANGUAGE", "3"),
        ];
        for (key, value) in overrides {
            std::env::set_var(key, value);
        }
        let result = EdgeConfig::load(None);
        std::env::set_var("JLPT_EDGE__LOCALIZATION__DEFAULT_LANGUAGE", "jp");
        let named = EdgeConfig::load(None);
        for (key, _) in overrides {
            std::env::remove_var(key);
        }

        let config = tokio_test::assert_ok!(result);
        assert_eq!(config.rate_limiting.message_limit, 9);
        assert_eq!(config.localization.default_language, Language::En);
        let config = tokio_test::assert_ok!(named);
        assert_eq!(config.localization.default_language, Language::Jp);
    }
}
