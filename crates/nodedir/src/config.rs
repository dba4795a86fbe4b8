//! Configuration management for nodedir.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::media::DEFAULT_MAX_IMAGE_BYTES;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "nodedir";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "directory.db";

/// Environment variable prefix.
const ENV_PREFIX: &str = "NODEDIR_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `NODEDIR_`, sections split on `__`,
///    e.g. `NODEDIR_MEDIA__MAX_IMAGE_BYTES`)
/// 2. TOML config file at `~/.config/nodedir/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Admin console configuration.
    pub admin: AdminConfig,
    /// Spreadsheet import configuration.
    pub import: ImportConfig,
    /// Image input configuration.
    pub media: MediaConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the slot database.
    /// Defaults to `~/.local/share/nodedir/directory.db`
    pub database_path: Option<PathBuf>,
    /// Byte quota for all slots combined. Set to 0 for unlimited.
    pub quota_bytes: usize,
}

/// Admin console configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Shared access code for mutating commands.
    ///
    /// This is a convenience gate, not a security boundary.
    pub access_code: String,
}

/// Spreadsheet import configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Title given to imported participants when no title column is mapped.
    pub default_title: String,
    /// Field delimiter for files whose extension does not imply one.
    pub default_delimiter: char,
}

/// Image input configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Largest image file that may be embedded, in bytes.
    pub max_image_bytes: u64,
    /// Hosts whose URLs are accepted without an image file extension.
    pub trusted_hosts: Vec<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Will be resolved to default at runtime
            quota_bytes: 5 * 1024 * 1024,
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            access_code: "123".to_string(),
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            default_title: "Leader".to_string(),
            default_delimiter: ',',
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            trusted_hosts: vec!["images.unsplash.com".to_string()],
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// A missing file is not an error; defaults and environment apply.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing, or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.admin.access_code.is_empty() {
            return Err(Error::ConfigValidation {
                message: "admin.access_code must not be empty".to_string(),
            });
        }

        if self.media.max_image_bytes == 0 {
            return Err(Error::ConfigValidation {
                message: "media.max_image_bytes must be greater than 0".to_string(),
            });
        }

        let delimiter = self.import.default_delimiter;
        if !delimiter.is_ascii() || delimiter == '"' || delimiter == '\n' || delimiter == '\r' {
            return Err(Error::ConfigValidation {
                message: format!("import.default_delimiter {delimiter:?} is not usable"),
            });
        }

        if self.import.default_title.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "import.default_title must not be blank".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the storage quota, `None` meaning unlimited.
    #[must_use]
    pub fn quota(&self) -> Option<usize> {
        match self.storage.quota_bytes {
            0 => None,
            bytes => Some(bytes),
        }
    }

    /// Get the default delimiter as a byte for the CSV reader.
    #[must_use]
    pub fn default_delimiter(&self) -> u8 {
        u8::try_from(self.import.default_delimiter).unwrap_or(b',')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.admin.access_code, "123");
        assert_eq!(config.import.default_title, "Leader");
        assert_eq!(config.media.max_image_bytes, 2 * 1024 * 1024);
        assert_eq!(config.quota(), Some(5 * 1024 * 1024));
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_access_code() {
        let mut config = Config::default();
        config.admin.access_code = String::new();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("access_code"));
    }

    #[test]
    fn test_validate_zero_image_limit() {
        let mut config = Config::default();
        config.media.max_image_bytes = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("max_image_bytes"));
    }

    #[test]
    fn test_validate_bad_delimiter() {
        let mut config = Config::default();
        config.import.default_delimiter = '"';
        assert!(config.validate().is_err());

        config.import.default_delimiter = 'é';
        assert!(config.validate().is_err());

        config.import.default_delimiter = ';';
        assert!(config.validate().is_ok());
        assert_eq!(config.default_delimiter(), b';');
    }

    #[test]
    fn test_validate_blank_default_title() {
        let mut config = Config::default();
        config.import.default_title = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_quota_zero_is_unlimited() {
        let mut config = Config::default();
        config.storage.quota_bytes = 0;
        assert!(config.quota().is_none());
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        assert!(config
            .database_path()
            .to_string_lossy()
            .contains("directory.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("nodedir"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config.media, MediaConfig::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = std::env::temp_dir().join(format!("nodedir_config_{}.toml", std::process::id()));
        std::fs::write(
            &path,
            r#"
[admin]
access_code = "summit"

[media]
trusted_hosts = ["cdn.example.org"]
"#,
        )
        .unwrap();

        let config = Config::load_from(Some(path.clone())).unwrap();
        assert_eq!(config.admin.access_code, "summit");
        assert_eq!(config.media.trusted_hosts, vec!["cdn.example.org"]);
        assert_eq!(config.import.default_title, "Leader");

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_import_config_deserialize() {
        let json = r#"{"default_title": "Guest"}"#;
        let import: ImportConfig = serde_json::from_str(json).unwrap();
        assert_eq!(import.default_title, "Guest");
        assert_eq!(import.default_delimiter, ',');
    }
}
