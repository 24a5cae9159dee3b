//! 存储接口 Trait 定义
//!
//! 定义认证核心依赖的异步存储接口：
//! - UserStore：用户存储
//! - SessionStore：会话存储
//!
//! 设计原则：
//! - 所有接口返回 StorageError
//! - 唯一性（邮箱、subject、token）由存储约束保证，应用层不加锁
//! - 使用 async_trait 支持动态分发，生产用 Postgres 实现，测试用内存实现

use crate::error::StorageError;
use crate::models::{SessionRecord, SessionWithUser, UserRecord};
use async_trait::async_trait;

/// 用户存储接口
///
/// 提供用户创建与查询功能（禁止在 handler 中直接连 SQL）。
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 创建用户；邮箱或第三方 subject 重复返回 `Conflict`
    async fn create_user(&self, record: UserRecord) -> Result<UserRecord, StorageError>;

    /// 根据用户 ID 查找用户
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserRecord>, StorageError>;

    /// 根据邮箱查找用户
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StorageError>;

    /// 根据第三方身份 subject 查找用户
    async fn find_by_external_subject(
        &self,
        subject: &str,
    ) -> Result<Option<UserRecord>, StorageError>;

    /// 为已有账户关联第三方身份 subject
    ///
    /// 账户不存在或已关联其他 subject 时返回 `None`，不覆盖已有关联。
    async fn link_external_subject(
        &self,
        user_id: &str,
        subject: &str,
    ) -> Result<Option<UserRecord>, StorageError>;
}

/// 会话存储接口
///
/// 每条会话对应一次签发的 token 对，access/refresh token 全局唯一。
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// 写入新会话；token 冲突视为存储错误
    async fn create(&self, session: SessionRecord) -> Result<(), StorageError>;

    /// 按 access token 查找会话并加载用户
    ///
    /// 行存在但 `expires_at` 已过返回 `SessionExpired`，不存在返回 `NotFound`。
    async fn find_by_access_token(&self, token: &str) -> Result<SessionWithUser, StorageError>;

    /// 按 refresh token 查找会话并加载用户
    ///
    /// 仅校验 `refresh_expires_at`，access token 是否过期不影响刷新。
    async fn find_by_refresh_token(&self, token: &str) -> Result<SessionWithUser, StorageError>;

    /// 删除 access token 或 refresh token 等于 `token` 的会话；零行命中返回 `NotFound`
    async fn delete(&self, token: &str) -> Result<(), StorageError>;

    /// 删除所有 refresh 有效期已过的会话，返回删除行数（幂等）
    async fn delete_expired(&self) -> Result<u64, StorageError>;

    /// 吊销某用户的全部会话，返回删除行数
    async fn delete_all_for_user(&self, user_id: &str) -> Result<u64, StorageError>;
}
