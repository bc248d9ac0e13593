//! Configuration management for the CLI
//!
//! This module handles loading and saving configuration from:
//! - Default values
//! - Configuration files (YAML/JSON/TOML)
//! - Environment variables (via clap `env` attributes)
//!
//! The `settings` section is the monitor's [`Settings`] snapshot. The
//! [`FileSettingsProvider`] re-reads it on every call so that edits made
//! while `watch` is running take effect on the next poll.

use crate::error::{Error, Result};
use quotawatch_core::{HttpClientConfig, Settings, SettingsProvider};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Monitor settings consumed by the request layer
    pub settings: Settings,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Where to find the access token when none is passed
    pub credentials: CredentialsConfig,

    /// HTTP client settings
    pub network: NetworkConfig,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Use colored output by default
    pub color: bool,

    /// Show progress spinners while requests are in flight
    pub progress: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when no verbosity flag is given
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,

    /// Log file path
    pub file: Option<PathBuf>,
}

/// Credential lookup configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Token file written by an external OAuth helper
    pub token_file: Option<PathBuf>,
}

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Connect timeout in milliseconds; the per-attempt timeout still applies
    pub connect_timeout_ms: Option<u64>,

    /// Validate TLS certificates
    pub validate_tls: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: None,
            validate_tls: true,
        }
    }
}

impl NetworkConfig {
    pub fn client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            connect_timeout: self.connect_timeout_ms.map(Duration::from_millis),
            validate_tls: self.validate_tls,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            progress: true,
        }
    }
}

/// On-disk format, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Yaml,
    Json,
    Toml,
}

impl FileFormat {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => FileFormat::Yaml,
            Some("toml") => FileFormat::Toml,
            _ => FileFormat::Json,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, FileFormat::from_path(path))
    }

    fn parse(content: &str, format: FileFormat) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config = match format {
            FileFormat::Yaml => serde_yaml::from_str(content)?,
            FileFormat::Toml => toml::from_str(content)?,
            FileFormat::Json => serde_json::from_str(content)?,
        };
        Ok(config)
    }

    /// Load configuration from default locations. An unreadable default
    /// file yields defaults and is reported through [`Loaded::fallback`].
    pub fn load() -> Loaded {
        Self::load_found(Self::find_existing())
    }

    fn load_found(found: Option<PathBuf>) -> Loaded {
        match found {
            Some(path) => match Self::from_file(&path) {
                Ok(config) => Loaded::from(config),
                Err(e) => Loaded {
                    config: Self::default(),
                    fallback: Some((path, e)),
                },
            },
            None => Loaded::from(Self::default()),
        }
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Loaded> {
        match file {
            Some(path) => Self::from_file(path).map(Loaded::from),
            None => Ok(Self::load()),
        }
    }

    /// Like [`Config::load_with_file`], but an explicit file that does not
    /// exist yet yields defaults. `config init` and `config set` create it.
    pub fn load_for_editing(file: Option<&Path>) -> Result<Loaded> {
        match file {
            Some(path) if !path.exists() => Ok(Loaded::from(Self::default())),
            _ => Self::load_with_file(file),
        }
    }

    /// Path that `config set` and `config init` write to: the explicit
    /// file, else the first existing default, else the user config file.
    pub fn target_path(file: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = file {
            return Ok(path.to_path_buf());
        }
        Self::find_existing()
            .or_else(Self::user_config_path)
            .ok_or_else(|| Error::config("Unable to determine user config directory"))
    }

    /// First default config path that exists
    pub fn find_existing() -> Option<PathBuf> {
        Self::default_config_paths().into_iter().find(|p| p.exists())
    }

    /// User-level config file (`$XDG_CONFIG/quotawatch/config.yaml`)
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("quotawatch").join("config.yaml"))
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // Current directory
        for ext in ["yaml", "json", "toml"] {
            paths.push(PathBuf::from(format!(".quotawatch.{}", ext)));
        }

        // User config directory
        if let Some(config_dir) = dirs::config_dir() {
            let dir = config_dir.join("quotawatch");
            for ext in ["yaml", "json", "toml"] {
                paths.push(dir.join(format!("config.{}", ext)));
            }
        }

        // Home directory
        if let Some(home_dir) = dirs::home_dir() {
            for ext in ["yaml", "json", "toml"] {
                paths.push(home_dir.join(format!(".quotawatch.{}", ext)));
            }
        }

        paths
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.render(FileFormat::from_path(path))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        tracing::debug!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    fn render(&self, format: FileFormat) -> Result<String> {
        Ok(match format {
            FileFormat::Yaml => serde_yaml::to_string(self)?,
            FileFormat::Json => serde_json::to_string_pretty(self)?,
            FileFormat::Toml => toml::to_string_pretty(self)
                .map_err(|e| Error::config(format!("Failed to serialize as TOML: {}", e)))?,
        })
    }

    /// Look up a dotted key such as `settings.hostMode`
    pub fn get_value(&self, key: &str) -> Result<Value> {
        let root = serde_json::to_value(self)?;
        key.split('.')
            .try_fold(&root, |node, segment| node.get(segment))
            .cloned()
            .ok_or_else(|| Error::config(format!("Unknown configuration key: {}", key)))
    }

    /// Set a dotted key. The value is read as JSON when it parses (numbers,
    /// booleans) and as a plain string otherwise. The result must still
    /// deserialize into a valid configuration.
    pub fn set_value(&mut self, key: &str, raw: &str) -> Result<()> {
        let mut root = serde_json::to_value(&*self)?;
        let slot = key
            .split('.')
            .try_fold(&mut root, |node, segment| node.get_mut(segment))
            .ok_or_else(|| Error::config(format!("Unknown configuration key: {}", key)))?;

        let value = match serde_json::from_str::<Value>(raw) {
            Ok(parsed) if !parsed.is_object() && !parsed.is_array() => parsed,
            _ => Value::String(raw.to_string()),
        };
        // String fields keep string values even when they look numeric
        *slot = match (&*slot, value) {
            (Value::String(_), Value::Number(n)) => Value::String(n.to_string()),
            (Value::String(_), Value::Bool(b)) => Value::String(b.to_string()),
            (_, value) => value,
        };

        *self = serde_json::from_value(root)
            .map_err(|e| Error::config(format!("Invalid value for {}: {}", key, e)))?;
        Ok(())
    }
}

/// A loaded configuration, plus the file and error behind a fallback to
/// defaults. The fallback is logged once the subscriber is installed.
#[derive(Debug)]
pub struct Loaded {
    pub config: Config,
    pub fallback: Option<(PathBuf, Error)>,
}

impl Loaded {
    pub fn log_fallback(&self) {
        if let Some((path, e)) = &self.fallback {
            tracing::warn!(path = %path.display(), error = %e, "Failed to load config, using defaults");
        }
    }
}

impl From<Config> for Loaded {
    fn from(config: Config) -> Self {
        Self { config, fallback: None }
    }
}

/// Settings provider backed by a config file, re-read on every call
#[derive(Debug, Clone)]
pub struct FileSettingsProvider {
    path: Option<PathBuf>,
}

impl FileSettingsProvider {
    /// Provider reading `path`, or the first existing default location
    pub fn new(path: Option<&Path>) -> Self {
        Self {
            path: path.map(Path::to_path_buf).or_else(Config::find_existing),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl SettingsProvider for FileSettingsProvider {
    fn load_settings(&self) -> Settings {
        let Some(path) = &self.path else {
            return Settings::default();
        };
        match Config::from_file(path) {
            Ok(config) => config.settings,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Settings unreadable, using defaults");
                Settings::default()
            }
        }
    }
}
