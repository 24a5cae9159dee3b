//! 在线课程平台认证 API 服务。
//!
//! 启动流程：
//! 1. 加载 .env 与环境变量配置
//! 2. 初始化 tracing
//! 3. 建立 Postgres 连接池，构造用户/会话存储
//! 4. 构造 token 编解码器、Google 身份校验器与认证服务
//! 5. 按需启动过期会话清理任务
//! 6. 监听 HTTP，收到 SIGINT/SIGTERM 后优雅停机

mod handlers;
mod middleware;
mod routes;
mod utils;


use academy_auth::{AuthService, GoogleIdTokenVerifier, TokenCodec};
use academy_config::AppConfig;
use academy_storage::{PgSessionStore, PgUserStore, connect_pool};
use academy_telemetry::init_tracing;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

/// 应用共享状态。
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    /// 就绪检查使用；测试环境为 None。
    pub db_pool: Option<PgPool>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    init_tracing();

    let pool = connect_pool(&config.database_url, config.db_max_connections).await?;
    let users = Arc::new(PgUserStore::new(pool.clone()));
    let sessions = Arc::new(PgSessionStore::new(pool.clone()));
    let tokens = TokenCodec::new(&config.jwt_secret, config.access_ttl_seconds)?;
    let identity = Arc::new(GoogleIdTokenVerifier::new(config.google_client_id.clone())?);
    let auth = Arc::new(AuthService::new(
        users,
        sessions,
        tokens,
        identity,
        config.refresh_ttl_seconds,
    ));

    if config.session_sweep_seconds > 0 {
        spawn_session_sweeper(
            auth.clone(),
            Duration::from_secs(config.session_sweep_seconds),
        );
    }

    let state = AppState {
        auth,
        db_pool: Some(pool),
    };
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    tracing::info!(addr = %config.http_addr, "academy-api listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("academy-api stopped");
    Ok(())
}

/// 周期性删除 refresh 有效期已过的会话。
fn spawn_session_sweeper(auth: Arc<AuthService>, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // 第一次 tick 立即返回，跳过
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match auth.sweep_expired_sessions().await {
                Ok(0) => {}
                Ok(removed) => tracing::info!(removed, "expired sessions swept"),
                Err(err) => tracing::warn!(error = %err, "session sweep failed"),
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
