//! Configuration management.
//!
//! Settings come from a TOML file layered with `READWISE_DISPLAY_*`
//! environment variables (`__` separates sections):
//!
//! ```toml
//! [api]
//! key = "your-readwise-token"
//! base_url = "https://readwise.io/api/v2"
//! # timeout_secs = 30
//!
//! [sampling]
//! page_size = 20
//!
//! [display]
//! refresh_interval_secs = 10
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::Credential;
use crate::sources::READWISE_API_BASE;

/// File name searched for in the working directory
pub const CONFIG_FILE_NAME: &str = "readwise-display.toml";

/// Prefix for environment overrides, e.g. `READWISE_DISPLAY_SAMPLING__PAGE_SIZE`
pub const ENV_PREFIX: &str = "READWISE_DISPLAY";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Readwise API access
    #[serde(default)]
    pub api: ApiConfig,

    /// Random sampling settings
    #[serde(default)]
    pub sampling: SamplingConfig,

    /// Display refresh settings
    #[serde(default)]
    pub display: DisplayConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Readwise API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Access token (falls back to `READWISE_API_KEY`)
    #[serde(default = "default_api_key")]
    pub key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout; unset means the HTTP client's default
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: default_api_key(),
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

impl ApiConfig {
    pub fn credential(&self) -> Credential {
        Credential::from(self.key.clone())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn default_api_key() -> Option<String> {
    std::env::var("READWISE_API_KEY").ok()
}

fn default_base_url() -> String {
    READWISE_API_BASE.to_string()
}

/// Sampling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Highlights per page when sampling
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> u32 {
    crate::sampler::DEFAULT_PAGE_SIZE
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Seconds between automatic refreshes in watch mode
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
        }
    }
}

/// Shortest refresh interval accepted, in seconds
pub const MIN_REFRESH_INTERVAL_SECS: u64 = 5;

/// Longest refresh interval accepted, in seconds
pub const MAX_REFRESH_INTERVAL_SECS: u64 = 300;

fn default_refresh_interval() -> u64 {
    10
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `"json"` for structured output, anything else for plain text
    #[serde(default)]
    pub format: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format
            .as_deref()
            .is_some_and(|f| f.eq_ignore_ascii_case("json"))
    }
}

impl Config {
    /// Check values the type system cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sampling.page_size == 0 {
            return Err(ConfigError::Invalid(
                "sampling.page_size must be at least 1".to_string(),
            ));
        }
        let interval = self.display.refresh_interval_secs;
        if !(MIN_REFRESH_INTERVAL_SECS..=MAX_REFRESH_INTERVAL_SECS).contains(&interval) {
            return Err(ConfigError::Invalid(format!(
                "display.refresh_interval_secs must be between {} and {}, got {}",
                MIN_REFRESH_INTERVAL_SECS, MAX_REFRESH_INTERVAL_SECS, interval
            )));
        }
        url::Url::parse(&self.api.base_url).map_err(|e| {
            ConfigError::Invalid(format!("api.base_url '{}': {}", self.api.base_url, e))
        })?;
        Ok(())
    }

    /// Save configuration to a TOML file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Copy of this configuration safe to print
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.api.key.is_some() {
            copy.api.key = Some("<redacted>".to_string());
        }
        copy
    }
}

/// `READWISE_DISPLAY_<SECTION>__<KEY>` overrides
fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn build_config(file: Option<&Path>) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = file {
        builder = builder.add_source(config::File::from(path));
    }
    let settings = builder.add_source(env_source()).build()?;

    let config: Config = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a file, with environment overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    build_config(Some(path))
}

/// Defaults plus environment overrides, for when no config file exists
pub fn load_env_config() -> Result<Config, ConfigError> {
    build_config(None)
}

/// Per-user configuration path, e.g. `~/.config/readwise-display/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("readwise-display").join("config.toml"))
}

/// Find a configuration file in the working directory or the user config dir
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    default_config_path().filter(|path| path.is_file())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard};
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Serializes tests that load config, since env overrides are process-wide
    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sampling.page_size, 20);
        assert_eq!(config.display.refresh_interval_secs, 10);
        assert_eq!(config.api.base_url, READWISE_API_BASE);
        assert!(config.api.timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_config_file() {
        let _env = env_lock();
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[api]
key = "file-key"
base_url = "http://localhost:8080/api/v2"
timeout_secs = 15

[sampling]
page_size = 50

[logging]
level = "debug"
format = "json"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.api.key.as_deref(), Some("file-key"));
        assert_eq!(config.api.timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.sampling.page_size, 50);
        assert_eq!(config.display.refresh_interval_secs, 10);
        assert!(config.logging.is_json());
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let _env = env_lock();
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[sampling]\npage_size = 0\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_bad_base_url_rejected() {
        let mut config = Config::default();
        config.api.base_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_save_load_roundtrip() {
        let _env = env_lock();
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.api.key = Some("saved-key".to_string());
        config.display.refresh_interval_secs = 30;
        config.save(&path).unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.api.key.as_deref(), Some("saved-key"));
        assert_eq!(loaded.display.refresh_interval_secs, 30);
    }

    #[test]
    fn test_missing_file() {
        let _env = env_lock();
        let result = load_config(Path::new("/nonexistent/readwise-display.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_redacted_hides_key() {
        let mut config = Config::default();
        config.api.key = Some("secret".to_string());
        let shown = toml::to_string(&config.redacted()).unwrap();
        assert!(!shown.contains("secret"));
    }

    #[test]
    fn test_refresh_interval_bounds() {
        let mut config = Config::default();
        config.display.refresh_interval_secs = MIN_REFRESH_INTERVAL_SECS;
        assert!(config.validate().is_ok());
        config.display.refresh_interval_secs = MAX_REFRESH_INTERVAL_SECS;
        assert!(config.validate().is_ok());

        config.display.refresh_interval_secs = 4;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        config.display.refresh_interval_secs = 301;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_env_overrides_file() {
        let _env = env_lock();
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[sampling]\npage_size = 20\n").unwrap();

        std::env::set_var("READWISE_DISPLAY_SAMPLING__PAGE_SIZE", "7");
        let loaded = load_config(&path);
        std::env::remove_var("READWISE_DISPLAY_SAMPLING__PAGE_SIZE");

        assert_eq!(loaded.unwrap().sampling.page_size, 7);
    }

    #[test]
    fn test_env_overrides_without_file() {
        let _env = env_lock();
        std::env::set_var("READWISE_DISPLAY_DISPLAY__REFRESH_INTERVAL_SECS", "60");
        let loaded = load_env_config();
        std::env::remove_var("READWISE_DISPLAY_DISPLAY__REFRESH_INTERVAL_SECS");

        let config = loaded.unwrap();
        assert_eq!(config.display.refresh_interval_secs, 60);
        assert_eq!(config.sampling.page_size, 20);
    }
}
