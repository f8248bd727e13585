//! 应用运行配置加载。
//!
//! - [`AppConfig`]：从环境变量读取的运行参数（监听地址、超时、重试策略）
//! - [`Config`]：从 YAML 文件读取的数据库连接参数（`PSQL` 段）

mod database;
mod duration;

pub use database::{Config, PostgresConfig, DEFAULT_SSL_MODE};
pub use duration::parse_duration;

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
    #[error("config file not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: String,
    pub database_config_path: PathBuf,
    pub index_template_path: PathBuf,
    /// 建立连接池的总时限（覆盖全部重试）。
    pub startup_timeout: Duration,
    pub db_connect_attempts: u32,
    pub db_retry_delay: Duration,
    /// 单次建池尝试（获取连接 + ping）的时限。
    pub db_attempt_timeout: Duration,
    pub drain_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_addr: "0.0.0.0:7878".to_string(),
            database_config_path: PathBuf::from("config/database.yml"),
            index_template_path: PathBuf::from("web/html/index.html"),
            startup_timeout: Duration::from_secs(15),
            db_connect_attempts: 5,
            db_retry_delay: Duration::from_secs(5),
            db_attempt_timeout: Duration::from_secs(2),
            drain_timeout: Duration::from_secs(15),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl AppConfig {
    /// 从环境变量读取配置，未设置的项使用默认值。
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let http_addr = env::var("FGW_HTTP_ADDR").unwrap_or(defaults.http_addr);
        let database_config_path = read_optional("FGW_DATABASE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or(defaults.database_config_path);
        let index_template_path = read_optional("FGW_INDEX_TEMPLATE")
            .map(PathBuf::from)
            .unwrap_or(defaults.index_template_path);
        let startup_timeout = Duration::from_secs(read_u64_with_default(
            "FGW_STARTUP_TIMEOUT_SECONDS",
            defaults.startup_timeout.as_secs(),
        )?);
        let db_connect_attempts =
            read_u32_with_default("FGW_DB_CONNECT_ATTEMPTS", defaults.db_connect_attempts)?;
        if db_connect_attempts == 0 {
            return Err(ConfigError::Invalid(
                "FGW_DB_CONNECT_ATTEMPTS".to_string(),
                "0".to_string(),
            ));
        }
        let db_retry_delay = Duration::from_millis(read_u64_with_default(
            "FGW_DB_RETRY_DELAY_MS",
            defaults.db_retry_delay.as_millis() as u64,
        )?);
        let db_attempt_timeout = Duration::from_millis(read_u64_with_default(
            "FGW_DB_ATTEMPT_TIMEOUT_MS",
            defaults.db_attempt_timeout.as_millis() as u64,
        )?);
        let drain_timeout = Duration::from_secs(read_u64_with_default(
            "FGW_DRAIN_TIMEOUT_SECONDS",
            defaults.drain_timeout.as_secs(),
        )?);
        let request_timeout = Duration::from_secs(read_u64_with_default(
            "FGW_REQUEST_TIMEOUT_SECONDS",
            defaults.request_timeout.as_secs(),
        )?);

        Ok(Self {
            http_addr,
            database_config_path,
            index_template_path,
            startup_timeout,
            db_connect_attempts,
            db_retry_delay,
            db_attempt_timeout,
            drain_timeout,
            request_timeout,
        })
    }
}

fn read_u32_with_default(key: &str, default: u32) -> Result<u32, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u32>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}
