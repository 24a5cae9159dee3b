use academy_config::{
    AppConfig, ConfigError, DEFAULT_ACCESS_TTL_SECONDS, DEFAULT_REFRESH_TTL_SECONDS,
};
use std::collections::HashMap;

fn required() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("ACADEMY_DATABASE_URL", "postgres://academy@localhost/academy"),
        ("ACADEMY_JWT_SECRET", "secret"),
        ("ACADEMY_GOOGLE_CLIENT_ID", "client-1.apps.googleusercontent.com"),
    ])
}

fn load(vars: &HashMap<&'static str, &'static str>) -> Result<AppConfig, ConfigError> {
    AppConfig::from_lookup(|key| vars.get(key).map(|value| value.to_string()))
}

#[test]
fn defaults_apply_when_optional_values_absent() {
    let config = load(&required()).expect("config");
    assert_eq!(config.http_addr, "127.0.0.1:3000");
    assert_eq!(config.access_ttl_seconds, 900);
    assert_eq!(config.refresh_ttl_seconds, 604_800);
    assert_eq!(config.access_ttl_seconds, DEFAULT_ACCESS_TTL_SECONDS);
    assert_eq!(config.refresh_ttl_seconds, DEFAULT_REFRESH_TTL_SECONDS);
    assert_eq!(config.session_sweep_seconds, 0);
    assert_eq!(config.db_max_connections, 8);
}

#[test]
fn missing_or_empty_secret_is_fatal() {
    let mut vars = required();
    vars.remove("ACADEMY_JWT_SECRET");
    assert!(matches!(load(&vars), Err(ConfigError::Missing(key)) if key == "ACADEMY_JWT_SECRET"));

    vars.insert("ACADEMY_JWT_SECRET", "   ");
    assert!(matches!(load(&vars), Err(ConfigError::Missing(_))));
}

#[test]
fn missing_google_client_id_is_fatal() {
    let mut vars = required();
    vars.remove("ACADEMY_GOOGLE_CLIENT_ID");
    assert!(matches!(
        load(&vars),
        Err(ConfigError::Missing(key)) if key == "ACADEMY_GOOGLE_CLIENT_ID"
    ));
}

#[test]
fn invalid_numbers_are_rejected() {
    let mut vars = required();
    vars.insert("ACADEMY_ACCESS_TTL_SECONDS", "fifteen");
    assert!(matches!(load(&vars), Err(ConfigError::Invalid(..))));

    let mut vars = required();
    vars.insert("ACADEMY_REFRESH_TTL_SECONDS", "0");
    assert!(matches!(load(&vars), Err(ConfigError::Invalid(..))));
}

#[test]
fn load_config_from_env() {
    // Rust 2024 中 set_var 需要显式标注 unsafe（测试进程内可控）。
    unsafe {
        std::env::set_var("ACADEMY_DATABASE_URL", "postgres://academy@localhost/academy");
        std::env::set_var("ACADEMY_JWT_SECRET", "secret");
        std::env::set_var("ACADEMY_GOOGLE_CLIENT_ID", "client-1");
        std::env::set_var("ACADEMY_HTTP_ADDR", "127.0.0.1:8081");
        std::env::set_var("ACADEMY_SESSION_SWEEP_SECONDS", "300");
    }

    let config = AppConfig::from_env().expect("config");
    assert_eq!(config.http_addr, "127.0.0.1:8081");
    assert_eq!(config.session_sweep_seconds, 300);
}
