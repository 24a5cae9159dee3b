//! 认证相关 handlers：注册、登录、刷新 token、登出
//!
//! ## 提供的端点（均无需认证）
//!
//! - `POST /api/signup` - 邮箱口令注册，成功返回 201 与 token 对
//! - `POST /api/login/email` - 邮箱口令登录
//! - `POST /api/login/google` - Google ID token 登录，首次登录自动建号
//! - `POST /api/refresh` - 使用 refresh token 轮换会话
//! - `POST /api/logout` - 删除 access 或 refresh token 对应的会话
//!
//! 成功响应统一为 `TokenResponse`；失败为 `{"error": "..."}`，
//! 状态码映射见 `utils::response::auth_error`。

use crate::AppState;
use crate::utils::response::{auth_error, tokens_to_response};
use crate::utils::validation::parse_json;
use api_contract::{
    EmailLoginRequest, GoogleLoginRequest, LogoutRequest, MessageResponse, RefreshTokenRequest,
    SignupRequest,
};
use academy_auth::AuthTokens;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

fn token_response(status: StatusCode, tokens: AuthTokens) -> Response {
    (status, Json(tokens_to_response(tokens))).into_response()
}

/// 注册接口
///
/// # Errors
///
/// - `400 BAD REQUEST`: 请求体无法解析或字段为空
/// - `409 CONFLICT`: 邮箱已注册
/// - `500 INTERNAL SERVER ERROR`: 存储或哈希失败
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Response {
    let req = match parse_json(payload) {
        Ok(req) => req,
        Err(response) => return response,
    };
    match state.auth.signup(&req.name, &req.email, &req.password).await {
        Ok(tokens) => token_response(StatusCode::CREATED, tokens),
        Err(err) => auth_error(err),
    }
}

/// 邮箱口令登录
///
/// 邮箱不存在与口令错误返回完全相同的 401 响应。
pub async fn login_email(
    State(state): State<AppState>,
    payload: Result<Json<EmailLoginRequest>, JsonRejection>,
) -> Response {
    let req = match parse_json(payload) {
        Ok(req) => req,
        Err(response) => return response,
    };
    match state.auth.login_with_email(&req.email, &req.password).await {
        Ok(tokens) => token_response(StatusCode::OK, tokens),
        Err(err) => auth_error(err),
    }
}

/// Google 登录
pub async fn login_google(
    State(state): State<AppState>,
    payload: Result<Json<GoogleLoginRequest>, JsonRejection>,
) -> Response {
    let req = match parse_json(payload) {
        Ok(req) => req,
        Err(response) => return response,
    };
    match state.auth.login_with_external(&req.google_token).await {
        Ok(tokens) => token_response(StatusCode::OK, tokens),
        Err(err) => auth_error(err),
    }
}

/// 刷新 token
///
/// 每次刷新都会删除旧会话并签发新的 token 对，旧 access/refresh token 同时失效。
pub async fn refresh(
    State(state): State<AppState>,
    payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> Response {
    let req = match parse_json(payload) {
        Ok(req) => req,
        Err(response) => return response,
    };
    match state.auth.refresh(&req.refresh_token).await {
        Ok(tokens) => token_response(StatusCode::OK, tokens),
        Err(err) => auth_error(err),
    }
}

/// 登出
///
/// 会话不存在同样返回 200。
pub async fn logout(
    State(state): State<AppState>,
    payload: Result<Json<LogoutRequest>, JsonRejection>,
) -> Response {
    let req = match parse_json(payload) {
        Ok(req) => req,
        Err(response) => return response,
    };
    match state.auth.logout(&req.token).await {
        Ok(_) => (
            StatusCode::OK,
            Json(MessageResponse {
                message: "logged out".to_string(),
            }),
        )
            .into_response(),
        Err(err) => auth_error(err),
    }
}
