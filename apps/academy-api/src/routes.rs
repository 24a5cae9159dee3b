//! 路由定义
//!
//! 集中管理所有 API 路由，将路径映射到对应的 handlers。
//! 路由包括：
//! - 健康检查：/health, /readyz, /livez
//! - 指标：/metrics
//! - 公开认证接口：/api/signup, /api/login/email, /api/login/google, /api/refresh, /api/logout
//! - 需会话的接口：/api/user/me, /api/logout/all（经 require_session）

use crate::AppState;
use crate::handlers::*;
use crate::middleware::{request_context, require_session};
use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

/// 创建完整的应用路由
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/user/me", get(me))
        .route("/api/logout/all", post(logout_all))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .route("/health", get(readyz))
        .route("/readyz", get(readyz))
        .route("/livez", get(livez))
        .route("/metrics", get(get_metrics))
        .route("/api/signup", post(signup))
        .route("/api/login/email", post(login_email))
        .route("/api/login/google", post(login_google))
        .route("/api/refresh", post(refresh))
        .route("/api/logout", post(logout))
        .merge(protected)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // 注入 request_id/trace_id
        .layer(middleware::from_fn(request_context))
}
