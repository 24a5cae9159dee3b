//! # Academy Storage 模块
//!
//! 本模块为认证核心提供存储抽象层，支持 PostgreSQL 与内存两种后端。
//!
//! ## 架构设计
//!
//! 1. **接口抽象层** (`traits.rs`)：`UserStore`、`SessionStore` 异步 Trait
//! 2. **数据模型层** (`models.rs`)：UserRecord、SessionRecord、SessionWithUser
//! 3. **错误处理层** (`error.rs`)：统一的 `StorageError`
//! 4. **连接管理层** (`connection.rs`)：PostgreSQL 连接池
//! 5. **实现层**：
//!    - `in_memory/`：内存存储实现（用于测试）
//!    - `postgres/`：PostgreSQL 存储实现（生产环境使用）
//!
//! ## 会话一致性规则
//!
//! - access token 与 refresh token 各自全局唯一，由唯一索引保证
//! - `expires_at` 只约束 access token；`refresh_expires_at` 约束刷新
//! - 按 token 删除零行命中返回 `NotFound`，调用方据此判断并发轮换的失败方
//! - 过期清理是维护操作，不在请求路径上执行
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use academy_storage::{InMemorySessionStore, InMemoryUserStore, SessionStore};
//! use std::sync::Arc;
//!
//! let users = Arc::new(InMemoryUserStore::new());
//! let sessions = InMemorySessionStore::new(users.clone());
//! let found = sessions.find_by_access_token("token").await;
//! ```

pub mod connection;
pub mod error;
pub mod in_memory;
pub mod models;
pub mod postgres;
pub mod traits;

pub use connection::*;
pub use error::*;
pub use models::*;
pub use traits::*;

pub use in_memory::{InMemorySessionStore, InMemoryUserStore};
pub use postgres::{PgSessionStore, PgUserStore};
