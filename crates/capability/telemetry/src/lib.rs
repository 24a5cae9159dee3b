//! 追踪、请求 ID 生成与认证计数。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 认证指标快照。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub signups: u64,
    pub logins: u64,
    pub login_failures: u64,
    pub refreshes: u64,
    pub logouts: u64,
    pub rejected_requests: u64,
}

/// 认证指标（进程内计数）。
#[derive(Default)]
pub struct TelemetryMetrics {
    signups: AtomicU64,
    logins: AtomicU64,
    login_failures: AtomicU64,
    refreshes: AtomicU64,
    logouts: AtomicU64,
    rejected_requests: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            signups: self.signups.load(Ordering::Relaxed),
            logins: self.logins.load(Ordering::Relaxed),
            login_failures: self.login_failures.load(Ordering::Relaxed),
            refreshes: self.refreshes.load(Ordering::Relaxed),
            logouts: self.logouts.load(Ordering::Relaxed),
            rejected_requests: self.rejected_requests.load(Ordering::Relaxed),
        }
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录注册次数（含首次第三方登录建号）。
pub fn record_signup() {
    metrics().signups.fetch_add(1, Ordering::Relaxed);
}

/// 记录登录成功次数。
pub fn record_login() {
    metrics().logins.fetch_add(1, Ordering::Relaxed);
}

/// 记录凭据错误次数。
pub fn record_login_failure() {
    metrics().login_failures.fetch_add(1, Ordering::Relaxed);
}

/// 记录 token 轮换次数。
pub fn record_refresh() {
    metrics().refreshes.fetch_add(1, Ordering::Relaxed);
}

/// 记录登出次数。
pub fn record_logout() {
    metrics().logouts.fetch_add(1, Ordering::Relaxed);
}

/// 记录被鉴权中间件拒绝的请求数。
pub fn record_rejected_request() {
    metrics().rejected_requests.fetch_add(1, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let before = metrics().snapshot();
        record_login();
        record_login_failure();
        record_rejected_request();
        let after = metrics().snapshot();
        assert!(after.logins > before.logins);
        assert!(after.login_failures > before.login_failures);
        assert!(after.rejected_requests > before.rejected_requests);
    }
}
