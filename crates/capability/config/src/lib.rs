//! 应用运行配置加载。
//!
//! 配置在进程启动时读取一次，之后以 `AppConfig` 注入各组件构造函数。

use std::env;

/// access token 默认有效期（秒）：15 分钟。
pub const DEFAULT_ACCESS_TTL_SECONDS: u64 = 15 * 60;
/// refresh token 默认有效期（秒）：7 天。
pub const DEFAULT_REFRESH_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub google_client_id: String,
    pub access_ttl_seconds: u64,
    pub refresh_ttl_seconds: u64,
    /// 过期会话清理间隔；0 表示不启动后台清理。
    pub session_sweep_seconds: u64,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源读取配置（空字符串视为未设置）。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let source = Source { lookup };
        let database_url = source.required("ACADEMY_DATABASE_URL")?;
        let jwt_secret = source.required("ACADEMY_JWT_SECRET")?;
        let google_client_id = source.required("ACADEMY_GOOGLE_CLIENT_ID")?;
        let http_addr = source
            .optional("ACADEMY_HTTP_ADDR")
            .unwrap_or_else(|| "127.0.0.1:3000".to_string());
        let db_max_connections = source.u32_with_default("ACADEMY_DB_MAX_CONNECTIONS", 8)?;
        let access_ttl_seconds =
            source.positive_u64("ACADEMY_ACCESS_TTL_SECONDS", DEFAULT_ACCESS_TTL_SECONDS)?;
        let refresh_ttl_seconds =
            source.positive_u64("ACADEMY_REFRESH_TTL_SECONDS", DEFAULT_REFRESH_TTL_SECONDS)?;
        let session_sweep_seconds = source.u64_with_default("ACADEMY_SESSION_SWEEP_SECONDS", 0)?;

        Ok(Self {
            http_addr,
            database_url,
            db_max_connections,
            jwt_secret,
            google_client_id,
            access_ttl_seconds,
            refresh_ttl_seconds,
            session_sweep_seconds,
        })
    }
}

struct Source<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Source<F> {
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::Missing(key.to_string()))
    }

    fn u64_with_default(&self, key: &str, default: u64) -> Result<u64, ConfigError> {
        let Some(value) = self.optional(key) else {
            return Ok(default);
        };
        value
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::Invalid(key.to_string(), value))
    }

    fn u32_with_default(&self, key: &str, default: u32) -> Result<u32, ConfigError> {
        let Some(value) = self.optional(key) else {
            return Ok(default);
        };
        match value.trim().parse::<u32>() {
            Ok(parsed) if parsed > 0 => Ok(parsed),
            _ => Err(ConfigError::Invalid(key.to_string(), value)),
        }
    }

    /// 读取必须大于 0 的 u64（TTL 类配置）。
    fn positive_u64(&self, key: &str, default: u64) -> Result<u64, ConfigError> {
        let value = self.u64_with_default(key, default)?;
        if value == 0 {
            return Err(ConfigError::Invalid(key.to_string(), "0".to_string()));
        }
        Ok(value)
    }
}
