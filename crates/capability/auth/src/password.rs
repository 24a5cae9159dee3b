use crate::AuthError;
use argon2::{
    Argon2,
    PasswordHash,
    PasswordHasher,
    PasswordVerifier,
    password_hash::{self, SaltString},
};
use rand_core::OsRng;
use std::sync::OnceLock;

#[cfg(test)]
thread_local! {
    /// 当前线程上 `verify_password` 的调用次数（测试观测用）。
    pub(crate) static VERIFY_CALLS: std::cell::Cell<u32> = const { std::cell::Cell::new(0) };
}

/// 口令哈希：Argon2id（默认参数）+ 随机盐，输出 PHC 字符串。
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| AuthError::Hashing(err.to_string()))?;
    Ok(hash.to_string())
}

/// 口令校验（常量时间比较由 argon2 完成）。
///
/// 不匹配返回 `InvalidCredentials`，调用方不得据此区分账户是否存在；
/// 存储的哈希无法解析返回 `Hashing`。
pub fn verify_password(stored_password_hash: &str, password: &str) -> Result<(), AuthError> {
    #[cfg(test)]
    VERIFY_CALLS.with(|calls| calls.set(calls.get() + 1));
    let parsed = PasswordHash::new(stored_password_hash)
        .map_err(|err| AuthError::Hashing(err.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(()),
        Err(password_hash::Error::Password) => Err(AuthError::InvalidCredentials),
        Err(err) => Err(AuthError::Hashing(err.to_string())),
    }
}

/// 固定的占位哈希，进程内只计算一次。
fn dummy_password_hash() -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    DUMMY
        .get_or_init(|| hash_password("academy-unknown-account").ok())
        .as_deref()
}

/// 预先计算占位哈希，避免首次登录失败时多付一次哈希开销。
pub(crate) fn warm_dummy_password_hash() {
    let _ = dummy_password_hash();
}

/// 账户不存在或没有口令时，对占位哈希做一次完整校验并丢弃结果，
/// 使这两条路径与口令错误的耗时一致。
pub(crate) fn verify_against_dummy(password: &str) {
    if let Some(hash) = dummy_password_hash() {
        let _ = verify_password(hash, password);
    }
}
