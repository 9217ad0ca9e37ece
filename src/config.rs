//! On-disk configuration.
//!
//! A small optional TOML file supplies startup defaults; every entry can be
//! overridden from the command line.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Root configuration container.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,
}

/// Startup defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Defaults {
    /// Initial prompt label.
    #[serde(default)]
    pub prompt: Option<String>,
    /// Treat row text as markup unless a line opts out.
    #[serde(default)]
    pub markup_rows: bool,
    /// Template for outbound event lines.
    #[serde(default)]
    pub event_format: Option<String>,
}

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/pipemenu/config.toml` on Unix/macOS, or equivalent on
    /// other platforms via `dirs::config_dir()`. Falls back to the current
    /// directory if no config directory is available.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("pipemenu").join("config.toml")
    }

    /// Loads configuration from the default config file. A missing file is
    /// not an error and yields the built-in defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::load_from(&dir.path().join("absent.toml")).expect("defaults");
        assert_eq!(config.defaults.prompt, None);
        assert!(!config.defaults.markup_rows);
        assert_eq!(config.defaults.event_format, None);
    }

    #[test]
    fn full_file_parses() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[defaults]
prompt = "apps"
markup_rows = true
event_format = "{{event}} {{value}}"
"#,
        )
        .expect("write config");

        let config = Config::load_from(&path).expect("parse");
        assert_eq!(config.defaults.prompt.as_deref(), Some("apps"));
        assert!(config.defaults.markup_rows);
        assert_eq!(
            config.defaults.event_format.as_deref(),
            Some("{{event}} {{value}}")
        );
    }

    #[test]
    fn partial_file_uses_field_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[defaults]\nprompt = \"only\"\n").expect("write config");

        let config = Config::load_from(&path).expect("parse");
        assert_eq!(config.defaults.prompt.as_deref(), Some("only"));
        assert!(!config.defaults.markup_rows);
    }

    #[test]
    fn broken_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[defaults\nnope").expect("write config");

        let err = match Config::load_from(&path) {
            Err(err) => err,
            Ok(_) => panic!("parse should fail"),
        };
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }
}
