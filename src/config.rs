use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use fridge_core::lookup::DEFAULT_BASE_URL;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Food database API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodApiConfig {
    /// API root (e.g., "https://api.edamam.com")
    pub base_url: String,
    pub app_id: Option<String>,
    pub app_key: Option<String>,
}

impl Default for FoodApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            app_id: None,
            app_key: None,
        }
    }
}

impl FoodApiConfig {
    /// Returns true if both credentials are set
    pub fn is_configured(&self) -> bool {
        self.app_id.is_some() && self.app_key.is_some()
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Root URL of the remote database
    pub database_url: ConfigValue<Option<String>>,
    /// Directory holding local state (the selection list)
    pub data_dir: ConfigValue<PathBuf>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
    pub food_api: FoodApiConfig,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    database_url: Option<String>,
    data_dir: Option<PathBuf>,
    food_api: Option<FoodApiConfig>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut database_url = ConfigValue::new(None, ConfigSource::Default);
        let mut data_dir = ConfigValue::new(Self::default_data_dir(), ConfigSource::Default);
        let mut config_file = None;
        let mut food_api = FoodApiConfig::default();

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(url) = file_config.database_url {
                database_url = ConfigValue::new(Some(url), ConfigSource::File);
            }
            if let Some(dir) = file_config.data_dir {
                // Resolve relative paths against config file's directory
                let resolved = if dir.is_relative() {
                    path.parent().map(|p| p.join(&dir)).unwrap_or(dir)
                } else {
                    dir
                };
                data_dir = ConfigValue::new(resolved, ConfigSource::File);
            }
            if let Some(api) = file_config.food_api {
                food_api = api;
            }
        }

        if let Ok(url) = std::env::var("FRIDGE_DATABASE_URL") {
            database_url = ConfigValue::new(Some(url), ConfigSource::Environment);
        }
        if let Ok(dir) = std::env::var("FRIDGE_DATA_DIR") {
            data_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Ok(url) = std::env::var("FRIDGE_FOOD_API_URL") {
            food_api.base_url = url;
        }
        if let Ok(id) = std::env::var("FRIDGE_FOOD_APP_ID") {
            food_api.app_id = Some(id);
        }
        if let Ok(key) = std::env::var("FRIDGE_FOOD_APP_KEY") {
            food_api.app_key = Some(key);
        }

        Ok(Self {
            database_url,
            data_dir,
            config_file,
            food_api,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/fridge/
    /// - macOS: ~/Library/Application Support/fridge/
    /// - Windows: %APPDATA%/fridge/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fridge")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/fridge/
    /// - macOS: ~/Library/Application Support/fridge/
    /// - Windows: %APPDATA%/fridge/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fridge")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
