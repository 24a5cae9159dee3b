//! Postgres 用户存储实现
//!
//! 通过 SQL 查询实现用户创建与查找功能。

use super::{USER_COLUMNS, user_from_row};
use crate::error::StorageError;
use crate::models::UserRecord;
use crate::traits::UserStore;
use sqlx::PgPool;

pub struct PgUserStore {
    pub pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, filter: &str, value: &str) -> Result<Option<UserRecord>, StorageError> {
        let sql = format!("select {USER_COLUMNS} from users u where {filter} = $1");
        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }
}

#[async_trait::async_trait]
impl UserStore for PgUserStore {
    async fn create_user(&self, record: UserRecord) -> Result<UserRecord, StorageError> {
        sqlx::query(
            "insert into users (id, google_id, email, name, password_hash, picture, role, created_at) \
             values ($1,$2,$3,$4,$5,$6,$7,$8)",
        )
        .bind(&record.user_id)
        .bind(&record.external_subject)
        .bind(&record.email)
        .bind(&record.name)
        .bind(&record.password_hash)
        .bind(&record.picture)
        .bind(record.role.as_str())
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }

    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserRecord>, StorageError> {
        self.find_one("u.id", user_id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StorageError> {
        self.find_one("u.email", email).await
    }

    async fn find_by_external_subject(
        &self,
        subject: &str,
    ) -> Result<Option<UserRecord>, StorageError> {
        self.find_one("u.google_id", subject).await
    }

    async fn link_external_subject(
        &self,
        user_id: &str,
        subject: &str,
    ) -> Result<Option<UserRecord>, StorageError> {
        // 已关联其他 subject 的账户零行命中，不覆盖
        let result = sqlx::query(
            "update users set google_id = $2 \
             where id = $1 and (google_id is null or google_id = $2)",
        )
        .bind(user_id)
        .bind(subject)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(user_id).await
    }
}
