//! 认证中间件
//!
//! 提供以下中间件和辅助函数：
//! - request_context：请求上下文中间件，注入 request_id/trace_id
//! - bearer_token：从 Authorization 头提取 Bearer token
//! - require_session：校验 access token 与会话，注入 CurrentUser
//!
//! 认证流程：
//! 1. request_context：在所有请求前注入追踪 ID
//! 2. bearer_token：头缺失 → MissingHeader；不是 `Bearer <token>` → MalformedHeader
//! 3. 校验 token 签名与过期 → 失败为 InvalidToken
//! 4. 按同一 access token 查找会话 → 不存在或已过期为 InvalidSession
//! 5. 放行：CurrentUser 写入请求扩展

use academy_auth::AuthError;
use academy_storage::UserRecord;
use academy_telemetry::{new_request_ids, record_rejected_request};
use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{Instrument, info_span};

use crate::AppState;
use crate::utils::response::{auth_error, error_response};

/// 通过鉴权的请求身份，handler 通过 `Extension<CurrentUser>` 读取。
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// 来自 token claims
    pub user_id: String,
    pub session_id: String,
    pub user: UserRecord,
}

/// 鉴权拒绝原因，均返回 401。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRejection {
    MissingHeader,
    MalformedHeader,
    InvalidToken,
    InvalidSession,
}

impl SessionRejection {
    pub fn message(self) -> &'static str {
        match self {
            SessionRejection::MissingHeader => "missing authorization header",
            SessionRejection::MalformedHeader => "invalid authorization header format",
            SessionRejection::InvalidToken => "invalid or expired token",
            SessionRejection::InvalidSession => "invalid session",
        }
    }
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        record_rejected_request();
        error_response(StatusCode::UNAUTHORIZED, self.message())
    }
}

/// 请求上下文中间件：注入 request_id/trace_id
pub async fn request_context(mut req: Request<Body>, next: Next) -> Response {
    let ids = new_request_ids();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    req.extensions_mut().insert(ids.clone());

    let span = info_span!(
        "request",
        request_id = %ids.request_id,
        trace_id = %ids.trace_id,
        method = %method,
        path = %path
    );

    let mut response = next.run(req).instrument(span).await;
    response.headers_mut().insert(
        "x-request-id",
        HeaderValue::from_str(&ids.request_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response.headers_mut().insert(
        "x-trace-id",
        HeaderValue::from_str(&ids.trace_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response
}

/// 从请求头中提取 Bearer token
///
/// 头的值必须恰好是空格分隔的两段，且第一段为字面量 `Bearer`。
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, SessionRejection> {
    let Some(header_value) = headers.get(header::AUTHORIZATION) else {
        return Err(SessionRejection::MissingHeader);
    };
    let auth_str = header_value
        .to_str()
        .map_err(|_| SessionRejection::MalformedHeader)?;
    if auth_str.is_empty() {
        return Err(SessionRejection::MissingHeader);
    }

    let mut parts = auth_str.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(SessionRejection::MalformedHeader),
    }
}

/// 会话鉴权中间件（`from_fn_with_state`）
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = match bearer_token(req.headers()) {
        Ok(token) => token.to_string(),
        Err(rejection) => return rejection.into_response(),
    };

    match state.auth.authenticate(&token).await {
        Ok(authenticated) => {
            tracing::debug!(
                user_id = %authenticated.user_id,
                session_id = %authenticated.session_id,
                "request authenticated"
            );
            req.extensions_mut().insert(CurrentUser {
                user_id: authenticated.user_id,
                session_id: authenticated.session_id,
                user: authenticated.user,
            });
            next.run(req).await
        }
        Err(AuthError::InvalidToken) => SessionRejection::InvalidToken.into_response(),
        Err(AuthError::InvalidSession) => SessionRejection::InvalidSession.into_response(),
        Err(err) => auth_error(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn bearer_token_extracts() {
        assert_eq!(bearer_token(&headers("Bearer token-1")), Ok("token-1"));
    }

    #[test]
    fn missing_or_empty_header() {
        assert_eq!(
            bearer_token(&HeaderMap::new()),
            Err(SessionRejection::MissingHeader)
        );
        assert_eq!(
            bearer_token(&headers("")),
            Err(SessionRejection::MissingHeader)
        );
    }

    #[test]
    fn malformed_headers() {
        for value in [
            "token-1",
            "Basic token-1",
            "bearer token-1",
            "Bearer",
            "Bearer ",
            "Bearer a b",
            "Bearer  token-1",
        ] {
            assert_eq!(
                bearer_token(&headers(value)),
                Err(SessionRejection::MalformedHeader),
                "{value:?}"
            );
        }
    }
}
