//! 稳定的 DTO 与 API 响应契约。
//!
//! 所有字段均使用 snake_case；错误响应统一为 `{"error": "..."}`。

use serde::{Deserialize, Serialize};

/// 失败响应的错误体。
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// 仅含提示信息的成功响应。
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// 注册请求体。
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// 邮箱口令登录请求体。
#[derive(Debug, Deserialize)]
pub struct EmailLoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Google 登录请求体（携带 Google ID token）。
#[derive(Debug, Deserialize)]
pub struct GoogleLoginRequest {
    #[serde(default, alias = "id_token", alias = "credential")]
    pub google_token: String,
}

/// 刷新 token 请求体。
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    #[serde(default)]
    pub refresh_token: String,
}

/// 登出请求体（access 或 refresh token 均可）。
#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    #[serde(default)]
    pub token: String,
}

/// 用户返回结构（不含口令哈希）。
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserDto {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub picture: Option<String>,
    pub has_password: bool,
}

/// 登录/注册/刷新统一返回的 token 结构。
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// access token 过期时间（Unix 秒）。
    pub expires_at: i64,
    pub user: UserDto,
}

impl TokenResponse {
    pub const TOKEN_TYPE: &'static str = "Bearer";
}

/// 批量撤销会话的结果。
#[derive(Debug, Serialize, Deserialize)]
pub struct RevokedResponse {
    pub revoked: u64,
}

/// 健康检查结果。
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
}

/// 认证计数快照。
#[derive(Debug, Serialize, Deserialize)]
pub struct MetricsDto {
    pub signups: u64,
    pub logins: u64,
    pub login_failures: u64,
    pub refreshes: u64,
    pub logouts: u64,
    pub rejected_requests: u64,
}
