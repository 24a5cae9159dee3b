//! 请求体解析辅助函数
//!
//! axum 的 JSON 提取失败默认返回纯文本，这里统一转换为 400 `{"error": "..."}`。

use crate::utils::response::bad_request_error;
use axum::{Json, extract::rejection::JsonRejection, response::Response};

/// 解析 JSON 请求体，失败时返回 400 错误响应
pub fn parse_json<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejected request body");
            Err(bad_request_error(format!(
                "invalid request body: {}",
                rejection.body_text()
            )))
        }
    }
}
