//! Postgres 会话存储实现
//!
//! 设计要点：
//! - 查找会话时 join users，一次查询加载所属用户
//! - 按任一 token 删除，零行命中返回 `NotFound`
//! - 过期判定使用数据库调用方传入的当前时间（秒）

use super::{USER_COLUMNS, user_from_row};
use crate::error::StorageError;
use crate::models::{SessionRecord, SessionWithUser};
use crate::traits::SessionStore;
use domain::now_epoch_seconds;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

pub struct PgSessionStore {
    pub pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by(&self, column: &str, token: &str) -> Result<SessionWithUser, StorageError> {
        let sql = format!(
            "select s.id as session_id, s.user_id as session_user_id, s.access_token, \
             s.refresh_token, s.expires_at, s.refresh_expires_at, s.created_at, {USER_COLUMNS} \
             from sessions s join users u on u.id = s.user_id where s.{column} = $1"
        );
        let row = sqlx::query(&sql)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::NotFound)?;
        Ok(SessionWithUser {
            session: session_from_row(&row)?,
            user: user_from_row(&row)?,
        })
    }
}

fn session_from_row(row: &PgRow) -> Result<SessionRecord, StorageError> {
    Ok(SessionRecord {
        session_id: row.try_get("session_id")?,
        user_id: row.try_get("session_user_id")?,
        access_token: row.try_get("access_token")?,
        refresh_token: row.try_get("refresh_token")?,
        expires_at: row.try_get("expires_at")?,
        refresh_expires_at: row.try_get("refresh_expires_at")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait::async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, session: SessionRecord) -> Result<(), StorageError> {
        sqlx::query(
            "insert into sessions \
             (id, user_id, access_token, refresh_token, expires_at, refresh_expires_at, created_at) \
             values ($1,$2,$3,$4,$5,$6,$7)",
        )
        .bind(&session.session_id)
        .bind(&session.user_id)
        .bind(&session.access_token)
        .bind(&session.refresh_token)
        .bind(session.expires_at)
        .bind(session.refresh_expires_at)
        .bind(session.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_access_token(&self, token: &str) -> Result<SessionWithUser, StorageError> {
        let found = self.find_by("access_token", token).await?;
        if found.session.access_expired(now_epoch_seconds()) {
            return Err(StorageError::SessionExpired);
        }
        Ok(found)
    }

    async fn find_by_refresh_token(&self, token: &str) -> Result<SessionWithUser, StorageError> {
        let found = self.find_by("refresh_token", token).await?;
        if found.session.refresh_expired(now_epoch_seconds()) {
            return Err(StorageError::SessionExpired);
        }
        Ok(found)
    }

    async fn delete(&self, token: &str) -> Result<(), StorageError> {
        let result =
            sqlx::query("delete from sessions where access_token = $1 or refresh_token = $1")
                .bind(token)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn delete_expired(&self) -> Result<u64, StorageError> {
        let result = sqlx::query("delete from sessions where refresh_expires_at < $1")
            .bind(now_epoch_seconds())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_all_for_user(&self, user_id: &str) -> Result<u64, StorageError> {
        let result = sqlx::query("delete from sessions where user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
