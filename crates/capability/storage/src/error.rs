//! 存储层错误类型
//!
//! 定义统一的存储错误类型，用于封装底层错误：
//! - 记录不存在（按 token 查找/删除会话时零行命中）
//! - 会话已过期（行存在但已超过有效期）
//! - 唯一约束冲突（邮箱、第三方 subject、token 重复）
//! - SQL 执行与连接错误

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("record not found")]
    NotFound,
    #[error("session expired")]
    SessionExpired,
    #[error("duplicate record: {0}")]
    Conflict(String),
    #[error("{0}")]
    Backend(String),
}

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::Conflict(db_err.message().to_string())
            }
            other => Self::Backend(other.to_string()),
        }
    }
}
