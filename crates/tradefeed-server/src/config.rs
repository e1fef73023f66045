//! Layered configuration: built-in defaults, an optional TOML file,
//! `TRADEFEED_*` environment variables, then CLI flags, in that order
//! of increasing precedence (spec §6 "Configuration (enumerated)").

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("tcp_port must be in 1..=65535, got {0}")]
    InvalidTcpPort(u16),
    #[error("pipe_name must not be empty")]
    EmptyPipeName,
    #[error("batch_size must be in 1..=10000, got {0}")]
    InvalidBatchSize(u32),
    #[error("batch_timeout_ms must be in 1..=10000, got {0}")]
    InvalidBatchTimeoutMs(u32),
    #[error("max_refresh_fps must be in 1..=120, got {0}")]
    InvalidMaxRefreshFps(u32),
    #[error("tcp_buffer_size must be greater than zero")]
    InvalidTcpBufferSize,
    #[error("log_directory must not be empty")]
    EmptyLogDirectory,
}

/// Validated startup configuration . Every field here has a
/// documented range; `load`/`validate` are the only way to obtain one.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tcp_port: u16,
    pub pipe_name: String,
    pub batch_size: u32,
    pub batch_timeout_ms: u32,
    pub max_refresh_fps: u32,
    pub tcp_buffer_size: u32,
    pub enable_metrics: bool,
    pub log_directory: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tcp_port: 9999,
            pipe_name: "TradingDataPipe".to_string(),
            batch_size: 1_000,
            batch_timeout_ms: 100,
            max_refresh_fps: 60,
            tcp_buffer_size: 8_192,
            enable_metrics: true,
            log_directory: PathBuf::from("Logs"),
        }
    }
}

impl Config {
    /// Loads defaults, then an optional TOML file, then `TRADEFEED_*`
    /// environment variables, validating the merged result.
    pub fn load(config_path: Option<&Path>) -> Result<Config, ConfigError> {
        let defaults = Config::default();
        let mut builder = config::Config::builder()
            .set_default("tcp_port", i64::from(defaults.tcp_port))?
            .set_default("pipe_name", defaults.pipe_name.clone())?
            .set_default("batch_size", i64::from(defaults.batch_size))?
            .set_default("batch_timeout_ms", i64::from(defaults.batch_timeout_ms))?
            .set_default("max_refresh_fps", i64::from(defaults.max_refresh_fps))?
            .set_default("tcp_buffer_size", i64::from(defaults.tcp_buffer_size))?
            .set_default("enable_metrics", defaults.enable_metrics)?
            .set_default(
                "log_directory",
                defaults.log_directory.to_string_lossy().into_owned(),
            )?;

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::from(path.to_path_buf()).required(false));
        }
        builder = builder.add_source(config::Environment::with_prefix("TRADEFEED"));

        let merged = builder.build()?;
        let config: Config = merged.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Re-validates after CLI overrides have been applied on top of a
    /// loaded `Config` .
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tcp_port == 0 {
            return Err(ConfigError::InvalidTcpPort(self.tcp_port));
        }
        if self.pipe_name.trim().is_empty() {
            return Err(ConfigError::EmptyPipeName);
        }
        if !(1..=10_000).contains(&self.batch_size) {
            return Err(ConfigError::InvalidBatchSize(self.batch_size));
        }
        if !(1..=10_000).contains(&self.batch_timeout_ms) {
            return Err(ConfigError::InvalidBatchTimeoutMs(self.batch_timeout_ms));
        }
        if !(1..=120).contains(&self.max_refresh_fps) {
            return Err(ConfigError::InvalidMaxRefreshFps(self.max_refresh_fps));
        }
        if self.tcp_buffer_size == 0 {
            return Err(ConfigError::InvalidTcpBufferSize);
        }
        if self.log_directory.as_os_str().is_empty() {
            return Err(ConfigError::EmptyLogDirectory);
        }
        Ok(())
    }

    /// `1000 / fps` . Kept
    /// for a GUI consumer even though this binary has none.
    pub fn ui_update_interval_ms(&self) -> u32 {
        1_000 / self.max_refresh_fps
    }

    /// Filesystem path of the local named byte-stream endpoint,
    /// namespaced under `/tmp` the way a named pipe would be namespaced
    /// under its OS's local-IPC directory.
    pub fn socket_path(&self) -> String {
        format!("/tmp/{}.sock", self.pipe_name)
    }

    /// `metrics_YYYYMMDD_HHMMSS.csv` under `log_directory` .
    pub fn metrics_csv_path(&self) -> PathBuf {
        let now = chrono::Utc::now();
        self.log_directory
            .join(format!("metrics_{}.csv", now.format("%Y%m%d_%H%M%S")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let config = Config::default();
        assert_eq!(config.tcp_port, 9999);
        assert_eq!(config.pipe_name, "TradingDataPipe");
        assert_eq!(config.batch_size, 1_000);
        assert_eq!(config.batch_timeout_ms, 100);
        assert_eq!(config.ui_update_interval_ms(), 16);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_batch_size() {
        let mut config = Config::default();
        config.batch_size = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBatchSize(0))
        ));
    }

    #[test]
    fn rejects_empty_pipe_name() {
        let mut config = Config::default();
        config.pipe_name = String::new();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyPipeName)));
    }

    #[test]
    fn load_with_no_file_falls_back_to_defaults() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.tcp_port, 9999);
    }
}
