//! 认证计数快照。
//!
//! - GET /metrics

use academy_telemetry::metrics;
use api_contract::MetricsDto;
use axum::{Json, response::IntoResponse};

pub async fn get_metrics() -> impl IntoResponse {
    let snapshot = metrics().snapshot();
    Json(MetricsDto {
        signups: snapshot.signups,
        logins: snapshot.logins,
        login_failures: snapshot.login_failures,
        refreshes: snapshot.refreshes,
        logouts: snapshot.logouts,
        rejected_requests: snapshot.rejected_requests,
    })
}
