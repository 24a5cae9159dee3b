//! 认证能力：口令哈希、access/refresh token、Google 身份校验与会话编排。

mod google;
mod jwt;
mod password;
mod service;

use academy_storage::{StorageError, UserRecord};

pub use google::{
    ExternalIdentity, GoogleIdTokenVerifier, IdentityVerifier, StaticIdentityVerifier,
};
pub use jwt::{AccessClaims, IssuedAccessToken, TokenCodec};
pub use password::{hash_password, verify_password};
pub use service::{AuthService, Authenticated};

/// 认证相关错误。
///
/// 认证失败类错误（凭据、token、会话）对外统一为 401，文案不区分原因。
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("email already registered")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("invalid session")]
    InvalidSession,
    #[error("invalid external identity token")]
    InvalidExternalToken,
    #[error("user not found")]
    UserNotFound,
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("internal error: {0}")]
    Internal(String),
}

/// 登录/注册/刷新返回的 token 对及所属用户。
#[derive(Debug, Clone)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
    pub user: UserRecord,
}
