//! 健康检查
//!
//! - `GET /livez`：只反映进程存活
//! - `GET /health`、`GET /readyz`：检查 Postgres 连接

use crate::AppState;
use api_contract::HealthResponse;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Liveness 探针：不做外部依赖检查。
pub async fn livez() -> impl IntoResponse {
    Json(HealthResponse { ok: true })
}

/// Readiness 探针：执行 `select 1`，失败返回 503。
pub async fn readyz(State(state): State<AppState>) -> Response {
    let Some(pool) = state.db_pool.as_ref() else {
        return (StatusCode::OK, Json(HealthResponse { ok: true })).into_response();
    };

    match sqlx::query_scalar::<_, i32>("select 1").fetch_one(pool).await {
        Ok(_) => (StatusCode::OK, Json(HealthResponse { ok: true })).into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "readyz check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse { ok: false }),
            )
                .into_response()
        }
    }
}
