//! Google ID token 校验。
//!
//! 从 Google JWKS 端点拉取公钥（缓存 10 分钟），按 header 中的 `kid` 选择密钥，
//! 校验 RS256 签名、过期时间、audience（应用 client id）与 issuer。

use crate::AuthError;
use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use moka::sync::Cache;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

const GOOGLE_JWKS_URI: &str = "https://www.googleapis.com/oauth2/v3/certs";
const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];
const JWKS_CACHE_TTL: Duration = Duration::from_secs(600);
const JWKS_FETCH_TIMEOUT: Duration = Duration::from_secs(10);
/// JWKS 响应体上限（字节）。
const MAX_JWKS_SIZE: usize = 512 * 1024;

/// 第三方身份断言校验后得到的身份信息。
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalIdentity {
    pub subject: String,
    pub email: String,
    pub email_verified: bool,
    pub name: String,
    pub picture: Option<String>,
}

/// 第三方身份校验接口，便于替换实现与测试。
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// 校验原始断言；任何失败（格式、过期、audience 不符）均为 `InvalidExternalToken`。
    async fn verify(&self, assertion: &str) -> Result<ExternalIdentity, AuthError>;
}

#[derive(Debug, Deserialize)]
struct GoogleClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<bool>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

impl JwkSet {
    fn find(&self, kid: &str) -> Option<&Jwk> {
        self.keys
            .iter()
            .find(|key| key.kid.as_deref() == Some(kid) && key.kty == "RSA")
    }
}

#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    kid: Option<String>,
    kty: String,
    n: Option<String>,
    e: Option<String>,
}

/// Google ID token 校验器，绑定一个应用 client id。
///
/// 公钥集合按 JWKS 地址缓存；token 的 `kid` 不在缓存中时（Google 轮换密钥）
/// 立即失效缓存并重新拉取一次。
pub struct GoogleIdTokenVerifier {
    client_id: String,
    jwks_uri: String,
    http: reqwest::Client,
    cache: Cache<String, JwkSet>,
}

impl GoogleIdTokenVerifier {
    /// 创建校验器；client id 为空视为配置错误。
    pub fn new(client_id: impl Into<String>) -> Result<Self, AuthError> {
        let client_id = client_id.into();
        if client_id.trim().is_empty() {
            return Err(AuthError::Configuration("google client id is empty".to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(JWKS_FETCH_TIMEOUT)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|err| AuthError::Configuration(err.to_string()))?;
        Ok(Self {
            client_id,
            jwks_uri: GOOGLE_JWKS_URI.to_string(),
            http,
            cache: Cache::builder()
                .max_capacity(1)
                .time_to_live(JWKS_CACHE_TTL)
                .build(),
        })
    }

    /// 按 kid 取公钥：先查缓存，未命中则强制刷新一次。
    async fn key_for(&self, kid: &str) -> Result<Jwk, AuthError> {
        if let Some(cached) = self.cache.get(&self.jwks_uri) {
            if let Some(key) = cached.find(kid) {
                return Ok(key.clone());
            }
            tracing::info!(kid = %kid, "jwks kid not cached, refreshing for key rotation");
            self.cache.invalidate(&self.jwks_uri);
        }

        let fresh = self.fetch_jwks().await?;
        let key = fresh.find(kid).cloned();
        self.cache.insert(self.jwks_uri.clone(), fresh);
        key.ok_or(AuthError::InvalidExternalToken)
    }

    async fn fetch_jwks(&self) -> Result<JwkSet, AuthError> {
        let response = self
            .http
            .get(&self.jwks_uri)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| AuthError::Internal(format!("jwks fetch failed: {err}")))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|err| AuthError::Internal(format!("jwks read failed: {err}")))?;
        if bytes.len() > MAX_JWKS_SIZE {
            return Err(AuthError::Internal(format!(
                "jwks response too large: {} bytes (max {MAX_JWKS_SIZE})",
                bytes.len()
            )));
        }
        serde_json::from_slice(&bytes)
            .map_err(|err| AuthError::Internal(format!("jwks parse failed: {err}")))
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.client_id.as_str()]);
        validation.set_issuer(&GOOGLE_ISSUERS);
        validation
    }
}

#[async_trait]
impl IdentityVerifier for GoogleIdTokenVerifier {
    async fn verify(&self, assertion: &str) -> Result<ExternalIdentity, AuthError> {
        let header = decode_header(assertion).map_err(invalid_assertion)?;
        // 算法由我们固定为 RS256，不信任 header 中声明的算法
        if header.alg != Algorithm::RS256 {
            return Err(AuthError::InvalidExternalToken);
        }
        let kid = header.kid.ok_or(AuthError::InvalidExternalToken)?;
        let jwk = self.key_for(&kid).await?;
        let (Some(n), Some(e)) = (jwk.n.as_deref(), jwk.e.as_deref()) else {
            return Err(AuthError::InvalidExternalToken);
        };
        let key = DecodingKey::from_rsa_components(n, e).map_err(invalid_assertion)?;
        let claims = decode::<GoogleClaims>(assertion, &key, &self.validation())
            .map_err(invalid_assertion)?
            .claims;
        identity_from_claims(claims)
    }
}

fn identity_from_claims(claims: GoogleClaims) -> Result<ExternalIdentity, AuthError> {
    let email = claims
        .email
        .filter(|email| !email.is_empty())
        .ok_or(AuthError::InvalidExternalToken)?;
    let name = claims.name.unwrap_or_else(|| email.clone());
    Ok(ExternalIdentity {
        subject: claims.sub,
        email,
        email_verified: claims.email_verified.unwrap_or(false),
        name,
        picture: claims.picture,
    })
}

fn invalid_assertion(err: jsonwebtoken::errors::Error) -> AuthError {
    tracing::debug!(error = %err, "google id token rejected");
    AuthError::InvalidExternalToken
}

/// 固定断言表校验器（仅用于测试与本地开发）。
///
/// 断言原文作为键，命中即返回对应身份，否则 `InvalidExternalToken`。
#[derive(Default)]
pub struct StaticIdentityVerifier {
    identities: HashMap<String, ExternalIdentity>,
}

impl StaticIdentityVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(mut self, assertion: impl Into<String>, identity: ExternalIdentity) -> Self {
        self.identities.insert(assertion.into(), identity);
        self
    }
}

#[async_trait]
impl IdentityVerifier for StaticIdentityVerifier {
    async fn verify(&self, assertion: &str) -> Result<ExternalIdentity, AuthError> {
        self.identities
            .get(assertion)
            .cloned()
            .ok_or(AuthError::InvalidExternalToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64ct::{Base64UrlUnpadded, Encoding};

    #[test]
    fn empty_client_id_is_configuration_error() {
        assert!(matches!(
            GoogleIdTokenVerifier::new("  "),
            Err(AuthError::Configuration(_))
        ));
    }

    #[test]
    fn name_falls_back_to_email() {
        let claims: GoogleClaims =
            serde_json::from_str(r#"{"sub":"123","email":"a@x.com","email_verified":true}"#)
                .expect("claims");
        let identity = identity_from_claims(claims).expect("identity");
        assert_eq!(identity.subject, "123");
        assert_eq!(identity.name, "a@x.com");
        assert!(identity.email_verified);
        assert!(identity.picture.is_none());
    }

    #[test]
    fn missing_email_is_rejected() {
        let claims: GoogleClaims = serde_json::from_str(r#"{"sub":"123"}"#).expect("claims");
        assert!(matches!(
            identity_from_claims(claims),
            Err(AuthError::InvalidExternalToken)
        ));
    }

    /// 指向不可达地址的校验器：任何网络拉取都会失败为 `Internal`。
    fn offline_verifier() -> GoogleIdTokenVerifier {
        let mut verifier = GoogleIdTokenVerifier::new("client-1").expect("verifier");
        verifier.jwks_uri = "http://127.0.0.1:9/certs".to_string();
        verifier
    }

    fn rs256_assertion(kid: &str) -> String {
        let header = format!(r#"{{"alg":"RS256","typ":"JWT","kid":"{kid}"}}"#);
        format!("{}.e30.c2ln", Base64UrlUnpadded::encode_string(header.as_bytes()))
    }

    fn cached_set(kid: &str) -> JwkSet {
        JwkSet {
            keys: vec![Jwk {
                kid: Some(kid.to_string()),
                kty: "RSA".to_string(),
                n: Some("not-a-modulus".to_string()),
                e: Some("AQAB".to_string()),
            }],
        }
    }

    #[tokio::test]
    async fn cached_kid_is_used_without_fetch() {
        let verifier = offline_verifier();
        verifier
            .cache
            .insert(verifier.jwks_uri.clone(), cached_set("k1"));
        // 命中缓存后在签名校验阶段失败，而不是网络错误
        let result = verifier.verify(&rs256_assertion("k1")).await;
        assert!(matches!(result, Err(AuthError::InvalidExternalToken)));
    }

    #[tokio::test]
    async fn unknown_kid_forces_jwks_refresh() {
        let verifier = offline_verifier();
        verifier
            .cache
            .insert(verifier.jwks_uri.clone(), cached_set("old-key"));
        // kid 不在缓存中：缓存被失效并尝试重新拉取（此处拉取失败）
        let result = verifier.verify(&rs256_assertion("rotated-key")).await;
        assert!(matches!(result, Err(AuthError::Internal(_))));
        assert!(verifier.cache.get(&verifier.jwks_uri).is_none());
    }

    #[tokio::test]
    async fn malformed_assertion_is_rejected_before_fetch() {
        let verifier = GoogleIdTokenVerifier::new("client-1").expect("verifier");
        let result = verifier.verify("not-a-jwt").await;
        assert!(matches!(result, Err(AuthError::InvalidExternalToken)));
    }
}
