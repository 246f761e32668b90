use clap::ArgMatches;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::rest::protocol::build_base_url;
use crate::utils::error::JudoError;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_UPDATE_INTERVAL_SECONDS: u64 = 300;
pub const MIN_UPDATE_INTERVAL_SECONDS: u64 = 30;
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub device_name: String,

    // Connection settings
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub timeout_ms: u64,

    // Monitoring settings
    pub update_interval_seconds: u64,

    // Output settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub default_format: String,
    pub file_output: Option<FileOutputConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    pub enabled: bool,
    pub path: String,
    pub append: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: "./data/softwell.log".to_string(),
            append: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_format: "console".to_string(),
            file_output: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device_name: "JUDO Connectivity Module".to_string(),
            host: "192.168.1.100".to_string(),
            port: DEFAULT_PORT,
            username: "admin".to_string(),
            password: String::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            update_interval_seconds: DEFAULT_UPDATE_INTERVAL_SECONDS,
            output: OutputConfig::default(),
        }
    }
}

fn parse_arg<T: std::str::FromStr>(matches: &ArgMatches, id: &str) -> Result<Option<T>, JudoError>
where
    T::Err: std::fmt::Display,
{
    match matches.get_one::<String>(id) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| JudoError::ConfigError(format!("Invalid --{} '{}': {}", id, raw, e))),
        None => Ok(None),
    }
}

impl Config {
    /// Starts from `--config` (or defaults) and applies command line overrides.
    pub fn from_matches(matches: &ArgMatches) -> Result<Self, JudoError> {
        let mut config = match matches.get_one::<String>("config") {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(host) = matches.get_one::<String>("host") {
            config.host = host.clone();
        }
        if let Some(username) = matches.get_one::<String>("username") {
            config.username = username.clone();
        }
        if let Some(password) = matches.get_one::<String>("password") {
            config.password = password.clone();
        }
        if let Some(port) = parse_arg::<u16>(matches, "port")? {
            config.port = port;
        }
        if let Some(interval) = parse_arg::<u64>(matches, "interval")? {
            config.update_interval_seconds = interval;
        }
        if let Some(timeout) = parse_arg::<u64>(matches, "timeout-ms")? {
            config.timeout_ms = timeout;
        }
        if let Some(format) = matches.get_one::<String>("format") {
            config.output.default_format = format.clone();
        }
        if let Some(path) = matches.get_one::<String>("output-file") {
            config.output.file_output = Some(FileOutputConfig {
                enabled: true,
                path: path.clone(),
                append: true,
            });
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, JudoError> {
        let path = path.as_ref();
        info!("📄 Loading configuration from {}", path.display());
        let content = std::fs::read_to_string(path)
            .map_err(|e| JudoError::ConfigError(format!("Cannot read {}: {}", path.display(), e)))?;
        let config: Config = toml::from_str(&content)?;
        debug!("Loaded configuration for {}", config.base_url());
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), JudoError> {
        // Create directory if it doesn't exist
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), JudoError> {
        if self.host.trim().is_empty() {
            return Err(JudoError::ConfigError("host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(JudoError::ConfigError("port must not be 0".to_string()));
        }
        if self.update_interval_seconds < MIN_UPDATE_INTERVAL_SECONDS {
            return Err(JudoError::ConfigError(format!(
                "update interval {}s is below the minimum of {}s",
                self.update_interval_seconds, MIN_UPDATE_INTERVAL_SECONDS
            )));
        }
        if self.timeout_ms == 0 {
            return Err(JudoError::ConfigError("timeout_ms must be positive".to_string()));
        }
        match self.output.default_format.as_str() {
            "console" | "json" | "csv" => Ok(()),
            other => Err(JudoError::ConfigError(format!("Unknown output format '{}'", other))),
        }
    }

    pub fn base_url(&self) -> String {
        build_base_url(&self.host, self.port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_seconds)
    }
}
