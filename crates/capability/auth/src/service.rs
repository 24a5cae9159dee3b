//! 认证编排：注册、邮箱登录、Google 登录、刷新、登出与请求鉴权。

use crate::google::IdentityVerifier;
use crate::jwt::TokenCodec;
use crate::password::{
    hash_password, verify_against_dummy, verify_password, warm_dummy_password_hash,
};
use crate::{AuthError, AuthTokens};
use academy_storage::{SessionRecord, SessionStore, StorageError, UserRecord, UserStore};
use academy_telemetry as telemetry;
use domain::{UserRole, now_epoch_seconds};
use std::sync::Arc;
use uuid::Uuid;

/// 请求鉴权通过后的身份。
///
/// `user_id` 来自 token claims，`user` 来自会话行关联的用户。
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user_id: String,
    pub session_id: String,
    pub user: UserRecord,
}

/// 认证服务实现（基于 UserStore + SessionStore + JWT）。
pub struct AuthService {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
    tokens: TokenCodec,
    identity: Arc<dyn IdentityVerifier>,
    refresh_ttl_seconds: u64,
}

impl AuthService {
    /// 创建认证服务实例。
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        tokens: TokenCodec,
        identity: Arc<dyn IdentityVerifier>,
        refresh_ttl_seconds: u64,
    ) -> Self {
        warm_dummy_password_hash();
        Self {
            users,
            sessions,
            tokens,
            identity,
            refresh_ttl_seconds,
        }
    }

    /// 邮箱口令注册，成功后直接签发会话。
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthTokens, AuthError> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidInput(
                "name, email and password are required".to_string(),
            ));
        }
        if self.users.find_by_email(email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password(password)?;
        let record = UserRecord {
            user_id: Uuid::new_v4().to_string(),
            external_subject: None,
            email: email.to_string(),
            name: name.to_string(),
            password_hash: Some(password_hash),
            picture: None,
            role: UserRole::lowest(),
            created_at: now_epoch_seconds(),
        };
        // 并发注册同一邮箱时由唯一约束兜底
        let user = match self.users.create_user(record).await {
            Ok(user) => user,
            Err(StorageError::Conflict(_)) => return Err(AuthError::EmailTaken),
            Err(err) => return Err(err.into()),
        };
        tracing::info!(user_id = %user.user_id, "user signed up");
        telemetry::record_signup();
        self.issue_session(user).await
    }

    /// 邮箱口令登录。
    ///
    /// 邮箱不存在、账户无口令、口令错误均返回同一个 `InvalidCredentials`。
    pub async fn login_with_email(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthTokens, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidInput(
                "email and password are required".to_string(),
            ));
        }
        let user = match self.check_credentials(email, password).await {
            Ok(user) => user,
            Err(AuthError::InvalidCredentials) => {
                telemetry::record_login_failure();
                return Err(AuthError::InvalidCredentials);
            }
            Err(err) => return Err(err),
        };
        telemetry::record_login();
        self.issue_session(user).await
    }

    async fn check_credentials(&self, email: &str, password: &str) -> Result<UserRecord, AuthError> {
        let user = self.users.find_by_email(email).await?;
        let stored = user.as_ref().and_then(|user| user.password_hash.as_deref());
        match (user.as_ref(), stored) {
            (Some(user), Some(stored)) => {
                verify_password(stored, password)?;
                Ok(user.clone())
            }
            _ => {
                verify_against_dummy(password);
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Google 身份登录；首次登录自动创建最低权限账户（无口令）。
    ///
    /// 已存在同邮箱的账户时，仅当 Google 确认邮箱已验证才关联 subject，
    /// 否则拒绝登录，避免通过未验证邮箱接管账户。
    pub async fn login_with_external(&self, assertion: &str) -> Result<AuthTokens, AuthError> {
        if assertion.trim().is_empty() {
            return Err(AuthError::InvalidExternalToken);
        }
        let identity = self.identity.verify(assertion).await?;

        let user = match self.users.find_by_external_subject(&identity.subject).await? {
            Some(user) => user,
            None => match self.users.find_by_email(&identity.email).await? {
                Some(existing) => {
                    if !identity.email_verified {
                        tracing::warn!(
                            user_id = %existing.user_id,
                            "refusing to link unverified external email"
                        );
                        return Err(AuthError::InvalidExternalToken);
                    }
                    match self
                        .users
                        .link_external_subject(&existing.user_id, &identity.subject)
                        .await?
                    {
                        Some(linked) => linked,
                        None => {
                            tracing::warn!(
                                user_id = %existing.user_id,
                                "account already linked to another external subject"
                            );
                            return Err(AuthError::InvalidExternalToken);
                        }
                    }
                }
                None => {
                    let record = UserRecord {
                        user_id: Uuid::new_v4().to_string(),
                        external_subject: Some(identity.subject.clone()),
                        email: identity.email.clone(),
                        name: identity.name.clone(),
                        password_hash: None,
                        picture: identity.picture.clone(),
                        role: UserRole::lowest(),
                        created_at: now_epoch_seconds(),
                    };
                    match self.users.create_user(record).await {
                        Ok(user) => {
                            tracing::info!(
                                user_id = %user.user_id,
                                "user created from external identity"
                            );
                            telemetry::record_signup();
                            user
                        }
                        // 同一 subject 的并发首次登录：以先写入的账户为准
                        Err(StorageError::Conflict(constraint)) => {
                            tracing::debug!(%constraint, "external user created concurrently");
                            self.users
                                .find_by_external_subject(&identity.subject)
                                .await?
                                .ok_or(AuthError::InvalidExternalToken)?
                        }
                        Err(err) => return Err(err.into()),
                    }
                }
            },
        };
        telemetry::record_login();
        self.issue_session(user).await
    }

    /// 使用 refresh token 换取新 token 对（轮换）。
    ///
    /// 旧会话先删除再创建新会话。删除零行命中说明并发请求已完成轮换，本次请求失败；
    /// 其他删除错误只记录日志，不阻断刷新。
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthTokens, AuthError> {
        if refresh_token.is_empty() {
            return Err(AuthError::InvalidToken);
        }
        let found = match self.sessions.find_by_refresh_token(refresh_token).await {
            Ok(found) => found,
            Err(StorageError::NotFound | StorageError::SessionExpired) => {
                return Err(AuthError::InvalidToken);
            }
            Err(err) => return Err(err.into()),
        };

        match self.sessions.delete(refresh_token).await {
            Ok(()) => {}
            Err(StorageError::NotFound) => return Err(AuthError::InvalidToken),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    session_id = %found.session.session_id,
                    "failed to delete rotated session"
                );
            }
        }

        telemetry::record_refresh();
        self.issue_session(found.user).await
    }

    /// 登出：删除 access 或 refresh token 匹配的会话。
    ///
    /// 会话不存在视为已登出（幂等），返回 `false`。
    pub async fn logout(&self, token: &str) -> Result<bool, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::InvalidInput("token is required".to_string()));
        }
        match self.sessions.delete(token).await {
            Ok(()) => {
                telemetry::record_logout();
                Ok(true)
            }
            Err(StorageError::NotFound) => {
                tracing::debug!("logout for unknown session");
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// 吊销用户的全部会话，返回吊销数量。
    pub async fn logout_all(&self, user_id: &str) -> Result<u64, AuthError> {
        let revoked = self.sessions.delete_all_for_user(user_id).await?;
        tracing::info!(user_id = %user_id, revoked, "revoked all sessions");
        Ok(revoked)
    }

    /// 请求鉴权：先校验 token 签名/过期，再确认会话行仍然存在且未过期。
    pub async fn authenticate(&self, access_token: &str) -> Result<Authenticated, AuthError> {
        let claims = self.tokens.validate_access_token(access_token)?;
        let found = match self.sessions.find_by_access_token(access_token).await {
            Ok(found) => found,
            Err(StorageError::NotFound | StorageError::SessionExpired) => {
                return Err(AuthError::InvalidSession);
            }
            Err(err) => return Err(err.into()),
        };
        if found.session.user_id != claims.user_id {
            tracing::warn!(
                session_id = %found.session.session_id,
                "session owner does not match token subject"
            );
            return Err(AuthError::InvalidSession);
        }
        Ok(Authenticated {
            user_id: claims.user_id,
            session_id: found.session.session_id,
            user: found.user,
        })
    }

    /// 按 ID 读取当前用户。
    pub async fn current_user(&self, user_id: &str) -> Result<UserRecord, AuthError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// 清理 refresh 有效期已过的会话（维护操作）。
    pub async fn sweep_expired_sessions(&self) -> Result<u64, AuthError> {
        Ok(self.sessions.delete_expired().await?)
    }

    /// 签发 token 对并持久化为新会话。
    async fn issue_session(&self, user: UserRecord) -> Result<AuthTokens, AuthError> {
        let access = self.tokens.generate_access_token(&user.user_id, &user.email)?;
        let refresh_token = self.tokens.generate_refresh_token();
        let now = now_epoch_seconds();
        let session = SessionRecord {
            session_id: Uuid::new_v4().to_string(),
            user_id: user.user_id.clone(),
            access_token: access.token.clone(),
            refresh_token: refresh_token.clone(),
            expires_at: access.expires_at,
            refresh_expires_at: now + self.refresh_ttl_seconds as i64,
            created_at: now,
        };
        self.sessions.create(session).await?;
        Ok(AuthTokens {
            access_token: access.token,
            refresh_token,
            expires_at: access.expires_at,
            user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google::StaticIdentityVerifier;
    use crate::password::VERIFY_CALLS;
    use academy_storage::{InMemorySessionStore, InMemoryUserStore};

    fn service() -> AuthService {
        let users = Arc::new(InMemoryUserStore::new());
        let sessions = Arc::new(InMemorySessionStore::new(users.clone()));
        AuthService::new(
            users,
            sessions,
            TokenCodec::new("unit-secret", 900).expect("codec"),
            Arc::new(StaticIdentityVerifier::new()),
            3600,
        )
    }

    fn verify_calls() -> u32 {
        VERIFY_CALLS.with(|calls| calls.get())
    }

    async fn hasher_calls_for(auth: &AuthService, email: &str, password: &str) -> u32 {
        let before = verify_calls();
        let result = auth.login_with_email(email, password).await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        verify_calls() - before
    }

    // current_thread 运行时：所有调用都在测试线程上，线程局部计数可靠
    #[tokio::test]
    async fn every_failed_login_path_runs_the_hasher() {
        let auth = service();
        auth.signup("A", "a@x.com", "pw").await.expect("signup");
        auth.users
            .create_user(UserRecord {
                user_id: "google-only".to_string(),
                external_subject: Some("sub-1".to_string()),
                email: "g@x.com".to_string(),
                name: "G".to_string(),
                password_hash: None,
                picture: None,
                role: UserRole::Student,
                created_at: now_epoch_seconds(),
            })
            .await
            .expect("create passwordless user");

        assert_eq!(hasher_calls_for(&auth, "a@x.com", "nope").await, 1);
        assert_eq!(hasher_calls_for(&auth, "ghost@x.com", "pw").await, 1);
        assert_eq!(hasher_calls_for(&auth, "g@x.com", "pw").await, 1);
    }
}
