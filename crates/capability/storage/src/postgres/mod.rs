//! # PostgreSQL 存储实现模块
//!
//! 本模块提供认证存储接口的 PostgreSQL 实现，用于生产环境。
//!
//! ## 设计原则
//!
//! 1. **参数化查询**：所有 SQL 使用参数绑定（`$1`, `$2`），禁止字符串拼接
//! 2. **约束即协调**：邮箱、subject、access/refresh token 的唯一性由唯一索引保证，
//!    并发冲突表现为 `StorageError::Conflict`，应用层不加锁
//! 3. **原子删除**：按 token 删除以 `rows_affected` 判定是否命中，
//!    并发刷新同一 refresh token 时只有一个请求能删到旧会话
//!
//! ## 数据库模式要求
//!
//! 参见仓库根目录 `migrations/0001_auth.sql`：
//! - `users`：用户表（id, google_id, email, name, password_hash, picture, role, created_at）
//! - `sessions`：会话表（id, user_id, access_token, refresh_token, expires_at, refresh_expires_at, created_at）
//!
//! ## 索引
//! - `users.email`、`users.google_id`：唯一索引
//! - `sessions.access_token`、`sessions.refresh_token`：唯一索引
//! - `sessions.user_id`：吊销用户全部会话
//! - `sessions.refresh_expires_at`：过期清理

pub mod session;
pub mod user;

pub use session::*;
pub use user::*;

use crate::error::StorageError;
use crate::models::UserRecord;
use domain::UserRole;
use sqlx::Row;
use sqlx::postgres::PgRow;

/// 用户列（与 `user_from_row` 的取值保持一致）。
pub(crate) const USER_COLUMNS: &str =
    "u.id as user_id, u.google_id, u.email, u.name, u.password_hash, u.picture, u.role, \
     u.created_at as user_created_at";

/// 从查询行解析 UserRecord。
pub(crate) fn user_from_row(row: &PgRow) -> Result<UserRecord, StorageError> {
    let role: String = row.try_get("role")?;
    let role = role
        .parse::<UserRole>()
        .map_err(|err| StorageError::new(err.to_string()))?;
    Ok(UserRecord {
        user_id: row.try_get("user_id")?,
        external_subject: row.try_get("google_id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        password_hash: row.try_get("password_hash")?,
        picture: row.try_get("picture")?,
        role,
        created_at: row.try_get("user_created_at")?,
    })
}
