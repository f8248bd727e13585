use fgw_config::{AppConfig, Config, ConfigError};
use std::io::Write;
use std::time::Duration;

const VALID_CONFIG: &str = r#"PSQL:
  host: "postgresql"
  port: 5432
  name: "test_fgw_web_db"
  user: "test_user1"
  password: "test_pass123word"
  SSLMode: "require"
  maxOpenConns: 10
  maxIdleConns: 5
  connMaxLifetime: "5m"
  connMaxIdleTime: "1m"
"#;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

#[test]
fn load_valid_yaml() {
    let file = write_config(VALID_CONFIG);
    let config = Config::load(file.path()).expect("config");

    assert_eq!(config.psql.host, "postgresql");
    assert_eq!(config.psql.port, 5432);
    assert_eq!(config.psql.name, "test_fgw_web_db");
    assert_eq!(config.psql.user, "test_user1");
    assert_eq!(config.psql.ssl_mode(), "require");
    assert_eq!(config.psql.max_open_conns, Some(10));
    assert_eq!(config.psql.max_idle_conns, Some(5));
    assert_eq!(config.psql.conn_max_lifetime, Some(Duration::from_secs(300)));
    assert_eq!(config.psql.conn_max_idle_time, Some(Duration::from_secs(60)));
}

#[test]
fn pool_fields_are_optional() {
    let file = write_config(
        "PSQL:\n  host: db\n  port: 5432\n  name: d\n  user: u\n  password: p\n",
    );
    let config = Config::load(file.path()).expect("config");

    assert_eq!(config.psql.ssl_mode(), "disable");
    assert_eq!(config.psql.max_open_conns, None);
    assert_eq!(config.psql.conn_max_lifetime, None);
}

#[test]
fn missing_file_is_not_found() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("not_found.yml");

    let err = Config::load(&path).expect_err("missing file");
    assert!(matches!(err, ConfigError::NotFound(p) if p == path));
}

#[test]
fn malformed_port_is_parse_error() {
    let file = write_config("PSQL:\n  host: \"postgresql\"\n  port: not_a_number\n  name: \"db\"\n");

    let err = Config::load(file.path()).expect_err("invalid config");
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn malformed_duration_is_parse_error() {
    let file = write_config("PSQL:\n  host: db\n  port: 5432\n  connMaxLifetime: soon\n");

    let err = Config::load(file.path()).expect_err("invalid duration");
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn empty_document_parses_to_defaults() {
    let config = Config::from_yaml_str("").expect("empty config");
    assert_eq!(config, Config::default());
}

#[test]
fn empty_file_fails_validation() {
    let file = write_config("");

    let err = Config::load(file.path()).expect_err("empty config");
    assert!(matches!(err, ConfigError::Invalid(key, _) if key == "PSQL.host"));
}

#[test]
fn zero_port_fails_validation() {
    let file = write_config("PSQL:\n  host: db\n  port: 0\n  name: d\n  user: u\n");

    let err = Config::load(file.path()).expect_err("zero port");
    assert!(matches!(err, ConfigError::Invalid(key, _) if key == "PSQL.port"));
}

#[test]
fn debug_output_hides_password() {
    let file = write_config(VALID_CONFIG);
    let config = Config::load(file.path()).expect("config");

    let rendered = format!("{:?}", config.psql);
    assert!(!rendered.contains("test_pass123word"));
}

#[test]
fn load_app_config_from_env() {
    // Rust 2024 中 set_var 需要显式标注 unsafe（测试进程内可控）。
    unsafe {
        std::env::set_var("FGW_HTTP_ADDR", "127.0.0.1:8081");
        std::env::set_var("FGW_DB_CONNECT_ATTEMPTS", "3");
        std::env::set_var("FGW_DB_RETRY_DELAY_MS", "250");
        std::env::set_var("FGW_DRAIN_TIMEOUT_SECONDS", "2");
        std::env::set_var("FGW_DB_ATTEMPT_TIMEOUT_MS", "500");
    }

    let config = AppConfig::from_env().expect("config");
    assert_eq!(config.http_addr, "127.0.0.1:8081");
    assert_eq!(config.db_connect_attempts, 3);
    assert_eq!(config.db_retry_delay, Duration::from_millis(250));
    assert_eq!(config.drain_timeout, Duration::from_secs(2));
    assert_eq!(config.db_attempt_timeout, Duration::from_millis(500));
    assert_eq!(config.startup_timeout, Duration::from_secs(15));
}

#[test]
fn app_config_defaults() {
    let config = AppConfig::default();
    assert_eq!(config.http_addr, "0.0.0.0:7878");
    assert_eq!(config.db_connect_attempts, 5);
    assert_eq!(config.db_retry_delay, Duration::from_secs(5));
    assert_eq!(config.db_attempt_timeout, Duration::from_secs(2));
    assert_eq!(config.drain_timeout, Duration::from_secs(15));
}
