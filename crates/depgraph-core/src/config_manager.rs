use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to read config: {0}")]
    ReadError(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main configuration for DepGraph
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DepGraphConfig {
    /// Node identifier resolution settings
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolverConfig {
    /// Characters treated as path separators when deriving a project directory
    /// and trimming it from a node's file path
    #[serde(default = "default_path_separators")]
    pub path_separators: Vec<char>,

    /// Compare the project directory prefix ignoring case
    #[serde(default = "default_case_insensitive_paths")]
    pub case_insensitive_paths: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            path_separators: default_path_separators(),
            case_insensitive_paths: default_case_insensitive_paths(),
        }
    }
}

impl ResolverConfig {
    pub fn is_separator(&self, c: char) -> bool {
        self.path_separators.contains(&c)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "pretty", "compact", "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

const LOG_FORMATS: [&str; 3] = ["pretty", "compact", "json"];

// Default value functions
fn default_path_separators() -> Vec<char> {
    vec!['\\', '/']
}
fn default_case_insensitive_paths() -> bool {
    true
}
fn default_log_level() -> String {
    "warn".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

/// Configuration manager with file discovery and environment overrides
pub struct ConfigManager {
    config: DepGraphConfig,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration with the following precedence:
    /// 1. Environment variables (.env file)
    /// 2. Config file (.depgraph.toml, then ~/.depgraph/config.toml)
    /// 3. Defaults
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_dotenv();

        let (config, config_path) = Self::load_config_file()?;
        Self::finish(config, config_path, |key| std::env::var(key).ok())
    }

    /// Load an explicit config file, still honoring environment overrides.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load_dotenv();
        Self::from_file_with(path, |key| std::env::var(key).ok())
    }

    /// Load an explicit config file, reading `DEPGRAPH_*` overrides through
    /// `lookup` instead of the process environment.
    pub fn from_file_with<F>(path: impl AsRef<Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let config = Self::read_toml_file(path)?;
        Self::finish(config, Some(path.to_path_buf()), lookup)
    }

    fn finish<F>(
        config: DepGraphConfig,
        config_path: Option<PathBuf>,
        lookup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self::apply_overrides(config, lookup)?;
        Self::validate_config(&config)?;

        match &config_path {
            Some(path) => info!("Loaded configuration from {}", path.display()),
            None => info!("No config file found, using defaults"),
        }

        Ok(Self {
            config,
            config_path,
        })
    }

    fn load_dotenv() {
        if Path::new(".env").exists() {
            if let Err(e) = dotenv::from_filename(".env") {
                warn!("Failed to load .env file: {}", e);
            }
            return;
        }

        if let Some(home) = dirs::home_dir() {
            let home_env = home.join(".depgraph.env");
            if home_env.exists() {
                if let Err(e) = dotenv::from_path(&home_env) {
                    warn!("Failed to load .depgraph.env: {}", e);
                }
            }
        }
    }

    /// Search order:
    /// 1. ./.depgraph.toml
    /// 2. ~/.depgraph/config.toml
    fn load_config_file() -> Result<(DepGraphConfig, Option<PathBuf>), ConfigError> {
        let local_config = Path::new(".depgraph.toml");
        if local_config.exists() {
            let config = Self::read_toml_file(local_config)?;
            return Ok((config, Some(local_config.to_path_buf())));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".depgraph").join("config.toml");
            if user_config.exists() {
                let config = Self::read_toml_file(&user_config)?;
                return Ok((config, Some(user_config)));
            }
        }

        Ok((DepGraphConfig::default(), None))
    }

    fn read_toml_file(path: &Path) -> Result<DepGraphConfig, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Apply `DEPGRAPH_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(
        mut config: DepGraphConfig,
        lookup: F,
    ) -> Result<DepGraphConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("DEPGRAPH_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(format) = lookup("DEPGRAPH_LOG_FORMAT") {
            config.logging.format = format;
        }
        if let Some(separators) = lookup("DEPGRAPH_PATH_SEPARATORS") {
            config.resolver.path_separators = separators.chars().collect();
        }
        if let Some(value) = lookup("DEPGRAPH_CASE_INSENSITIVE_PATHS") {
            config.resolver.case_insensitive_paths = parse_bool(&value).ok_or_else(|| {
                ConfigError::ValidationError(format!(
                    "DEPGRAPH_CASE_INSENSITIVE_PATHS must be a boolean, got '{}'",
                    value
                ))
            })?;
        }

        Ok(config)
    }

    pub fn validate_config(config: &DepGraphConfig) -> Result<(), ConfigError> {
        if config.resolver.path_separators.is_empty() {
            return Err(ConfigError::ValidationError(
                "resolver.path_separators must contain at least one character".to_string(),
            ));
        }

        if !LOG_FORMATS.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid log format: {}. Must be one of: {}",
                config.logging.format,
                LOG_FORMATS.join(", ")
            )));
        }

        Ok(())
    }

    pub fn config(&self) -> &DepGraphConfig {
        &self.config
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn into_config(self) -> DepGraphConfig {
        self.config
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
