use crate::directory::DeletePolicy;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub reconciler: ReconcilerConfig,
    #[serde(default)]
    pub measurements: MeasurementConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: Option<u16>,
    pub unix_socket: Option<PathBuf>,
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_wal_path")]
    pub wal_path: PathBuf,
    #[serde(default = "default_user_capacity")]
    pub user_capacity: usize,
    #[serde(default = "default_page_capacity")]
    pub page_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
    /// Guards the metrics and measurement ingest endpoints
    pub api_key: String,
    #[serde(default = "default_hash_memory_kib")]
    pub hash_memory_kib: u32,
    #[serde(default = "default_hash_iterations")]
    pub hash_iterations: u32,
    #[serde(default = "default_hash_parallelism")]
    pub hash_parallelism: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReconcilerConfig {
    #[serde(default)]
    pub delete_policy: DeletePolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeasurementConfig {
    #[serde(default = "default_graph_limit")]
    pub graph_limit: usize,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_console")]
    pub console: bool,
}

// Default value functions
fn default_num_threads() -> usize {
    num_cpus::get()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_wal_path() -> PathBuf {
    PathBuf::from("pagewatch.wal")
}

fn default_user_capacity() -> usize {
    10_000
}

fn default_page_capacity() -> usize {
    50_000
}

fn default_min_password_length() -> usize {
    10
}

fn default_hash_memory_kib() -> u32 {
    argon2::Params::DEFAULT_M_COST
}

fn default_hash_iterations() -> u32 {
    argon2::Params::DEFAULT_T_COST
}

fn default_hash_parallelism() -> u32 {
    argon2::Params::DEFAULT_P_COST
}

fn default_graph_limit() -> usize {
    20
}

fn default_history_limit() -> usize {
    1_000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_console() -> bool {
    false
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            wal_path: default_wal_path(),
            user_capacity: default_user_capacity(),
            page_capacity: default_page_capacity(),
        }
    }
}

impl Default for MeasurementConfig {
    fn default() -> Self {
        Self {
            graph_limit: default_graph_limit(),
            history_limit: default_history_limit(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port.is_none() && self.server.unix_socket.is_none() {
            bail!("Either port or unix_socket must be specified in server config");
        }

        if self.server.port == Some(0) {
            bail!("Server port must be greater than 0");
        }

        if self.server.num_threads == 0 {
            bail!("num_threads must be greater than 0");
        }

        if self.server.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be greater than 0");
        }

        if self.storage.wal_path.as_os_str().is_empty() {
            bail!("wal_path must not be empty");
        }

        if self.auth.min_password_length == 0 {
            bail!("min_password_length must be greater than 0");
        }

        if self.auth.api_key.is_empty() {
            bail!("api_key must not be empty");
        }

        argon2::Params::new(
            self.auth.hash_memory_kib,
            self.auth.hash_iterations,
            self.auth.hash_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid password hashing parameters: {}", e))?;

        if self.measurements.graph_limit == 0 {
            bail!("graph_limit must be greater than 0");
        }

        if self.measurements.history_limit < self.measurements.graph_limit {
            bail!(
                "history_limit ({}) must be at least graph_limit ({})",
                self.measurements.history_limit,
                self.measurements.graph_limit
            );
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            bail!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            );
        }

        let valid_formats = ["json", "console"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            bail!(
                "Invalid log format '{}'. Must be one of: json, console",
                self.logging.format
            );
        }

        Ok(())
    }
}

/// Config with cheap hashing parameters and an in-tree WAL path
#[cfg(test)]
pub fn test_config(wal_path: PathBuf) -> Config {
    Config {
        server: ServerConfig {
            port: Some(8080),
            unix_socket: None,
            num_threads: 2,
            request_timeout_secs: 5,
        },
        storage: StorageConfig {
            wal_path,
            user_capacity: 100,
            page_capacity: 100,
        },
        auth: AuthConfig {
            min_password_length: 10,
            api_key: "test-api-key".to_string(),
            hash_memory_kib: 64,
            hash_iterations: 1,
            hash_parallelism: 1,
        },
        reconciler: ReconcilerConfig::default(),
        measurements: MeasurementConfig {
            graph_limit: 20,
            history_limit: 100,
        },
        logging: LoggingConfig {
            level: "info".to_string(),
            format: "json".to_string(),
            console: true,
        },
    }
}
