//! 数据模型
//!
//! 定义认证相关的存储模型：
//! - 用户模型：UserRecord
//! - 会话模型：SessionRecord（一次签发的 access/refresh token 对）
//! - 联合查询结果：SessionWithUser
//!
//! 时间字段统一为 Unix 秒级时间戳。

use domain::UserRole;

/// 用户记录。
///
/// `password_hash` 仅存在于邮箱口令账户；`external_subject` 仅存在于
/// 关联了 Google 身份的账户。两者可以同时存在（口令账户后续关联了 Google）。
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub user_id: String,
    pub external_subject: Option<String>,
    pub email: String,
    pub name: String,
    pub password_hash: Option<String>,
    pub picture: Option<String>,
    pub role: UserRole,
    pub created_at: i64,
}

/// 会话记录。
///
/// - `expires_at` 只约束 access token
/// - `refresh_expires_at` 约束 refresh token，过期后会话不可再刷新
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub session_id: String,
    pub user_id: String,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
    pub refresh_expires_at: i64,
    pub created_at: i64,
}

impl SessionRecord {
    /// access token 是否已过期。
    pub fn access_expired(&self, now: i64) -> bool {
        self.expires_at < now
    }

    /// refresh token 是否已过期。
    pub fn refresh_expired(&self, now: i64) -> bool {
        self.refresh_expires_at < now
    }
}

/// 会话及其所属用户（按 token 查找时一并加载）。
#[derive(Debug, Clone, PartialEq)]
pub struct SessionWithUser {
    pub session: SessionRecord,
    pub user: UserRecord,
}
