//! HTTP 响应辅助函数和 DTO 转换
//!
//! 提供统一的错误响应构造函数和 DTO 转换函数：
//! - 错误响应：error_response, bad_request_error, auth_error
//! - DTO 转换：user_to_dto, tokens_to_response
//!
//! 设计原则：
//! - 所有错误返回 `{"error": "..."}`
//! - 认证失败统一 401，文案不区分原因
//! - 内部错误详情只写日志，客户端只看到通用文案

use academy_auth::{AuthError, AuthTokens};
use academy_storage::UserRecord;
use api_contract::{ErrorBody, TokenResponse, UserDto};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// 构造错误响应
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorBody::new(message))).into_response()
}

/// 错误请求响应
pub fn bad_request_error(message: impl Into<String>) -> Response {
    error_response(StatusCode::BAD_REQUEST, message)
}

/// 认证服务错误到 HTTP 状态码的映射
pub fn auth_error(err: AuthError) -> Response {
    match err {
        AuthError::InvalidInput(message) => bad_request_error(message),
        AuthError::EmailTaken => error_response(StatusCode::CONFLICT, err.to_string()),
        AuthError::InvalidCredentials
        | AuthError::InvalidToken
        | AuthError::InvalidSession
        | AuthError::InvalidExternalToken => {
            error_response(StatusCode::UNAUTHORIZED, err.to_string())
        }
        AuthError::UserNotFound => error_response(StatusCode::NOT_FOUND, err.to_string()),
        AuthError::Configuration(_)
        | AuthError::Hashing(_)
        | AuthError::Storage(_)
        | AuthError::Internal(_) => {
            tracing::error!(error = %err, "request failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
        }
    }
}

/// UserRecord 转 UserDto（不输出口令哈希）
pub fn user_to_dto(record: UserRecord) -> UserDto {
    UserDto {
        has_password: record.password_hash.is_some(),
        id: record.user_id,
        email: record.email,
        name: record.name,
        role: record.role.as_str().to_string(),
        picture: record.picture,
    }
}

/// AuthTokens 转 TokenResponse
pub fn tokens_to_response(tokens: AuthTokens) -> TokenResponse {
    TokenResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        token_type: TokenResponse::TOKEN_TYPE.to_string(),
        expires_at: tokens.expires_at,
        user: user_to_dto(tokens.user),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_storage::StorageError;

    #[test]
    fn auth_errors_map_to_status_codes() {
        let cases = [
            (AuthError::InvalidInput("x".to_string()), StatusCode::BAD_REQUEST),
            (AuthError::EmailTaken, StatusCode::CONFLICT),
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::InvalidToken, StatusCode::UNAUTHORIZED),
            (AuthError::InvalidSession, StatusCode::UNAUTHORIZED),
            (AuthError::InvalidExternalToken, StatusCode::UNAUTHORIZED),
            (AuthError::UserNotFound, StatusCode::NOT_FOUND),
            (
                AuthError::Storage(StorageError::new("connection refused")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AuthError::Hashing("bad".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(auth_error(err).status(), status);
        }
    }
}
