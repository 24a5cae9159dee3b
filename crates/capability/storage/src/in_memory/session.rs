//! 会话内存存储实现
//!
//! 仅用于测试。行为与 Postgres 实现保持一致：
//! - access/refresh token 唯一（冲突返回 `Conflict`）
//! - 按 token 删除在写锁内完成，并发刷新时只有一方能删除成功
//! - 查找时通过 UserStore 加载所属用户

use crate::error::StorageError;
use crate::models::{SessionRecord, SessionWithUser};
use crate::traits::{SessionStore, UserStore};
use domain::now_epoch_seconds;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// 会话内存存储
///
/// 键为 session_id。用户数据来自注入的 UserStore，与数据库外键联查等价。
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, SessionRecord>>,
    users: Arc<dyn UserStore>,
}

impl InMemorySessionStore {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            users,
        }
    }

    /// 当前会话数量（测试辅助）。
    pub fn len(&self) -> usize {
        self.sessions.read().map(|map| map.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn find_where(
        &self,
        predicate: impl Fn(&SessionRecord) -> bool,
    ) -> Result<SessionRecord, StorageError> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| StorageError::new("session store lock poisoned"))?;
        sessions
            .values()
            .find(|session| predicate(session))
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn with_user(&self, session: SessionRecord) -> Result<SessionWithUser, StorageError> {
        let user = self
            .users
            .find_by_id(&session.user_id)
            .await?
            .ok_or(StorageError::NotFound)?;
        Ok(SessionWithUser { session, user })
    }

    fn retain(&self, keep: impl Fn(&SessionRecord) -> bool) -> Result<u64, StorageError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| StorageError::new("session store lock poisoned"))?;
        let before = sessions.len();
        sessions.retain(|_, session| keep(session));
        Ok((before - sessions.len()) as u64)
    }
}

#[async_trait::async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, session: SessionRecord) -> Result<(), StorageError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| StorageError::new("session store lock poisoned"))?;
        let collides = sessions.values().any(|existing| {
            existing.session_id == session.session_id
                || existing.access_token == session.access_token
                || existing.refresh_token == session.refresh_token
        });
        if collides {
            return Err(StorageError::Conflict("sessions token unique".to_string()));
        }
        sessions.insert(session.session_id.clone(), session);
        Ok(())
    }

    async fn find_by_access_token(&self, token: &str) -> Result<SessionWithUser, StorageError> {
        let session = self.find_where(|session| session.access_token == token)?;
        if session.access_expired(now_epoch_seconds()) {
            return Err(StorageError::SessionExpired);
        }
        self.with_user(session).await
    }

    async fn find_by_refresh_token(&self, token: &str) -> Result<SessionWithUser, StorageError> {
        let session = self.find_where(|session| session.refresh_token == token)?;
        if session.refresh_expired(now_epoch_seconds()) {
            return Err(StorageError::SessionExpired);
        }
        self.with_user(session).await
    }

    async fn delete(&self, token: &str) -> Result<(), StorageError> {
        let removed =
            self.retain(|session| session.access_token != token && session.refresh_token != token)?;
        if removed == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn delete_expired(&self) -> Result<u64, StorageError> {
        let now = now_epoch_seconds();
        self.retain(|session| !session.refresh_expired(now))
    }

    async fn delete_all_for_user(&self, user_id: &str) -> Result<u64, StorageError> {
        self.retain(|session| session.user_id != user_id)
    }
}
