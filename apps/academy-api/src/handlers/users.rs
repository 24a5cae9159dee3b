//! 需要会话的用户接口
//!
//! - `GET /api/user/me` - 当前用户信息
//! - `POST /api/logout/all` - 吊销当前用户的全部会话

use crate::AppState;
use crate::middleware::CurrentUser;
use crate::utils::response::{auth_error, user_to_dto};
use api_contract::RevokedResponse;
use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// 当前用户信息（按 token claims 中的 user_id 重新读取）
pub async fn me(State(state): State<AppState>, Extension(current): Extension<CurrentUser>) -> Response {
    match state.auth.current_user(&current.user_id).await {
        Ok(user) => (StatusCode::OK, Json(user_to_dto(user))).into_response(),
        Err(err) => auth_error(err),
    }
}

pub async fn logout_all(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Response {
    match state.auth.logout_all(&current.user_id).await {
        Ok(revoked) => (StatusCode::OK, Json(RevokedResponse { revoked })).into_response(),
        Err(err) => auth_error(err),
    }
}
