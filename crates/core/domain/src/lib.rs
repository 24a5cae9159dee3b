pub mod role;

pub use role::{ParseRoleError, UserRole};

use std::time::{SystemTime, UNIX_EPOCH};

/// 当前时间戳（秒）。
///
/// 会话过期、token 签发时间统一使用该时钟，存储层以 bigint 保存。
pub fn now_epoch_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or_default()
}
