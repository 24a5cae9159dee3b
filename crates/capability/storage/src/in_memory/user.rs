//! 用户内存存储实现
//!
//! 仅用于本地演示和测试。
//!
//! 功能：
//! - 按 ID / 邮箱 / 第三方 subject 查找用户
//! - 创建时模拟数据库唯一约束（邮箱、subject）

use crate::error::StorageError;
use crate::models::UserRecord;
use crate::traits::UserStore;
use std::collections::HashMap;
use std::sync::RwLock;

/// 用户内存存储
///
/// 使用 RwLock + HashMap 提供线程安全的内存存储，键为 user_id。
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn find_where(
        &self,
        predicate: impl Fn(&UserRecord) -> bool,
    ) -> Result<Option<UserRecord>, StorageError> {
        let users = self
            .users
            .read()
            .map_err(|_| StorageError::new("user store lock poisoned"))?;
        Ok(users.values().find(|user| predicate(user)).cloned())
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryUserStore {
    async fn create_user(&self, record: UserRecord) -> Result<UserRecord, StorageError> {
        let mut users = self
            .users
            .write()
            .map_err(|_| StorageError::new("user store lock poisoned"))?;
        if users.contains_key(&record.user_id) {
            return Err(StorageError::Conflict("users_pkey".to_string()));
        }
        if users.values().any(|user| user.email == record.email) {
            return Err(StorageError::Conflict("users_email_key".to_string()));
        }
        if let Some(subject) = record.external_subject.as_deref() {
            if users
                .values()
                .any(|user| user.external_subject.as_deref() == Some(subject))
            {
                return Err(StorageError::Conflict("users_google_id_key".to_string()));
            }
        }
        users.insert(record.user_id.clone(), record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserRecord>, StorageError> {
        let users = self
            .users
            .read()
            .map_err(|_| StorageError::new("user store lock poisoned"))?;
        Ok(users.get(user_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StorageError> {
        self.find_where(|user| user.email == email)
    }

    async fn find_by_external_subject(
        &self,
        subject: &str,
    ) -> Result<Option<UserRecord>, StorageError> {
        self.find_where(|user| user.external_subject.as_deref() == Some(subject))
    }

    async fn link_external_subject(
        &self,
        user_id: &str,
        subject: &str,
    ) -> Result<Option<UserRecord>, StorageError> {
        let mut users = self
            .users
            .write()
            .map_err(|_| StorageError::new("user store lock poisoned"))?;
        if users
            .values()
            .any(|user| user.user_id != user_id && user.external_subject.as_deref() == Some(subject))
        {
            return Err(StorageError::Conflict("users_google_id_key".to_string()));
        }
        let Some(user) = users.get_mut(user_id) else {
            return Ok(None);
        };
        // 已关联其他 subject 的账户不允许被覆盖
        if user
            .external_subject
            .as_deref()
            .is_some_and(|linked| linked != subject)
        {
            return Ok(None);
        }
        user.external_subject = Some(subject.to_string());
        Ok(Some(user.clone()))
    }
}
