//! Configuration loading and typed config structures for Livepoll.
//!
//! The configuration lives in `livepoll-config.yaml` in the working
//! directory. This module defines strongly-typed structs that mirror the
//! YAML structure and a loader that reads the file and applies environment
//! overrides. Every field has a default, so an empty or missing file is a
//! valid configuration.

use std::path::Path;

use serde::Deserialize;

use crate::broadcast::MAX_BROADCAST_CAPACITY;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The `PORT` environment variable is not a valid TCP port.
    #[error("invalid PORT value: {value:?}")]
    InvalidPort {
        /// The rejected value.
        value: String,
    },

    /// `session.broadcast_capacity` is zero or above
    /// [`MAX_BROADCAST_CAPACITY`].
    #[error("broadcast_capacity must be between 1 and {max}, got {value}")]
    InvalidCapacity {
        /// The rejected value.
        value: usize,
        /// Largest accepted value.
        max: usize,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level Livepoll configuration.
///
/// Mirrors the structure of `livepoll-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PollConfig {
    /// Listen address for the HTTP/WebSocket server.
    #[serde(default)]
    pub server: ServerSettings,

    /// Session behavior toggles.
    #[serde(default)]
    pub session: SessionConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PollConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for the listen address:
    /// - `PORT` overrides `server.port`
    /// - `HOST` overrides `server.host`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::InvalidPort`] if `PORT` is set but unparsable.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.server.apply_env_overrides()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise start from defaults. Environment
    /// overrides apply in both cases.
    ///
    /// # Errors
    ///
    /// Same as [`PollConfig::from_file`].
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::from_file(path);
        }
        let mut config = Self::default();
        config.server.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string. No environment overrides are
    /// applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML and
    /// [`ConfigError::InvalidCapacity`] if the broadcast capacity is out of
    /// range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        config.session.validate()?;
        Ok(config)
    }
}

/// Listen address for the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind (e.g. `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerSettings {
    /// Override the listen address with `HOST` / `PORT` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPort`] if `PORT` does not parse as a
    /// `u16`.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("HOST") {
            self.host = val;
        }
        if let Ok(val) = std::env::var("PORT") {
            self.port = parse_port(&val)?;
        }
        Ok(())
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Session behavior toggles.
///
/// The defaults reproduce the permissive behavior of the original poll
/// server: answers are accepted for any known question and an all-blank
/// free-text answer still counts as a response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    /// Reject submissions for questions that are not currently active.
    #[serde(default)]
    pub require_active_question: bool,

    /// Count a free-text submission that yields no words as a response.
    #[serde(default = "default_true")]
    pub count_empty_free_text: bool,

    /// Per-scope broadcast channel capacity. A receiver that falls further
    /// behind than this skips the oldest events.
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
}

impl SessionConfig {
    /// Check values serde cannot constrain on its own.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCapacity`] unless
    /// `1 <= broadcast_capacity <= MAX_BROADCAST_CAPACITY`.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        let value = self.broadcast_capacity;
        if value == 0 || value > MAX_BROADCAST_CAPACITY {
            return Err(ConfigError::InvalidCapacity {
                value,
                max: MAX_BROADCAST_CAPACITY,
            });
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            require_active_question: false,
            count_empty_free_text: true,
            broadcast_capacity: default_broadcast_capacity(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log filter used when `RUST_LOG` is unset (trace, debug, info, warn,
    /// error, or a full `EnvFilter` directive).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn parse_port(value: &str) -> Result<u16, ConfigError> {
    value
        .trim()
        .parse::<u16>()
        .map_err(|_parse| ConfigError::InvalidPort {
            value: value.to_owned(),
        })
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    3000
}

const fn default_true() -> bool {
    true
}

const fn default_broadcast_capacity() -> usize {
    256
}

fn default_log_level() -> String {
    String::from("info")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = PollConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert!(!config.session.require_active_question);
        assert!(config.session.count_empty_free_text);
        assert_eq!(config.session.broadcast_capacity, 256);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
server:
  host: "127.0.0.1"
  port: 8088

session:
  require_active_question: true
  count_empty_free_text: false
  broadcast_capacity: 16

logging:
  level: "debug"
"#;

        let config = PollConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8088);
        assert!(config.session.require_active_question);
        assert!(!config.session.count_empty_free_text);
        assert_eq!(config.session.broadcast_capacity, 16);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = PollConfig::parse("server:\n  port: 4000\n");
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.server.port, 4000);
        // Everything else uses defaults
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.session, SessionConfig::default());
    }

    #[test]
    fn parse_empty_yaml() {
        assert_eq!(PollConfig::parse("").ok(), Some(PollConfig::default()));
    }

    #[test]
    fn parse_rejects_malformed_yaml() {
        let result = PollConfig::parse("server: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn broadcast_capacity_out_of_range_is_rejected() {
        let huge = PollConfig::parse("session:\n  broadcast_capacity: 18446744073709551615\n");
        assert!(matches!(
            huge,
            Err(ConfigError::InvalidCapacity {
                value: usize::MAX,
                max: MAX_BROADCAST_CAPACITY,
            })
        ));

        let zero = PollConfig::parse("session:\n  broadcast_capacity: 0\n");
        assert!(matches!(zero, Err(ConfigError::InvalidCapacity { value: 0, .. })));

        let largest = format!("session:\n  broadcast_capacity: {MAX_BROADCAST_CAPACITY}\n");
        assert!(PollConfig::parse(&largest).is_ok());
    }

    #[test]
    fn port_values_are_validated() {
        assert_eq!(parse_port(" 8080 ").ok(), Some(8080));
        assert!(matches!(
            parse_port("eighty"),
            Err(ConfigError::InvalidPort { .. })
        ));
        assert!(parse_port("70000").is_err());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = PollConfig::from_file(Path::new("/nonexistent/livepoll-config.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("livepoll-config.yaml");
        if path.exists() {
            let config = PollConfig::parse(&std::fs::read_to_string(&path).unwrap_or_default());
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
