//! 内存存储实现模块
//!
//! 仅用于本地演示和测试。
//!
//! 包含以下实现：
//! - UserStore: InMemoryUserStore
//! - SessionStore: InMemorySessionStore

pub mod session;
pub mod user;

pub use session::*;
pub use user::*;
