//! 数据库连接参数（YAML）。
//!
//! 文件格式：
//!
//! ```yaml
//! PSQL:
//!   host: "postgresql"
//!   port: 5432
//!   name: "fgw_web_db"
//!   user: "fgw"
//!   password: "secret"
//!   SSLMode: "disable"
//!   maxOpenConns: 20
//!   maxIdleConns: 5
//!   connMaxLifetime: "1h"
//!   connMaxIdleTime: "30m"
//! ```
//!
//! 连接池相关字段均可省略，由存储层回退到默认值。

use crate::ConfigError;
use crate::duration;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// 未配置 `SSLMode` 时使用的取值。
pub const DEFAULT_SSL_MODE: &str = "disable";

/// 配置文件根结构。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(rename = "PSQL", default)]
    pub psql: PostgresConfig,
}

/// PostgreSQL 连接参数。
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    /// 数据库名
    pub name: String,
    pub user: String,
    pub password: String,
    #[serde(rename = "SSLMode")]
    pub ssl_mode: Option<String>,
    #[serde(rename = "maxOpenConns")]
    pub max_open_conns: Option<u32>,
    #[serde(rename = "maxIdleConns")]
    pub max_idle_conns: Option<u32>,
    #[serde(rename = "connMaxLifetime", deserialize_with = "duration::deserialize_opt")]
    pub conn_max_lifetime: Option<Duration>,
    #[serde(rename = "connMaxIdleTime", deserialize_with = "duration::deserialize_opt")]
    pub conn_max_idle_time: Option<Duration>,
}

impl Config {
    /// 读取并校验 YAML 配置文件。
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        let config = Self::from_yaml_str(&contents)?;
        config.psql.validate()?;
        Ok(config)
    }

    /// 仅解析，不校验。空文档得到全默认值。
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }
}

impl PostgresConfig {
    /// 返回 sslmode，未配置或为空时为 `disable`。
    pub fn ssl_mode(&self) -> &str {
        match self.ssl_mode.as_deref() {
            Some(mode) if !mode.is_empty() => mode,
            _ => DEFAULT_SSL_MODE,
        }
    }

    /// 校验必填字段。密码允许为空（trust 认证）。
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("PSQL.host", self.host.as_str()),
            ("PSQL.name", self.name.as_str()),
            ("PSQL.user", self.user.as_str()),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(key.to_string(), "empty".to_string()));
            }
        }
        if self.port == 0 {
            return Err(ConfigError::Invalid("PSQL.port".to_string(), "0".to_string()));
        }
        Ok(())
    }
}

impl fmt::Debug for PostgresConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"***")
            .field("ssl_mode", &self.ssl_mode)
            .field("max_open_conns", &self.max_open_conns)
            .field("max_idle_conns", &self.max_idle_conns)
            .field("conn_max_lifetime", &self.conn_max_lifetime)
            .field("conn_max_idle_time", &self.conn_max_idle_time)
            .finish()
    }
}
