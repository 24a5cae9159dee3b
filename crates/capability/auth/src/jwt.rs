use crate::AuthError;
use base64ct::{Base64Url, Encoding};
use domain::now_epoch_seconds;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// refresh token 随机字节数。
const REFRESH_TOKEN_BYTES: usize = 32;

/// access token claims。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub user_id: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// 新签发的 access token 及其过期时间（秒）。
#[derive(Debug, Clone)]
pub struct IssuedAccessToken {
    pub token: String,
    pub expires_at: i64,
}

/// access token 签发与校验（HS256），以及不透明 refresh token 生成。
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl_seconds: u64,
}

impl TokenCodec {
    /// 创建 token 编解码器；签名密钥为空视为配置错误。
    pub fn new(secret: impl AsRef<[u8]>, access_ttl_seconds: u64) -> Result<Self, AuthError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(AuthError::Configuration("jwt secret is empty".to_string()));
        }
        if access_ttl_seconds == 0 {
            return Err(AuthError::Configuration("access token ttl is zero".to_string()));
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_ttl_seconds,
        })
    }

    pub fn access_ttl_seconds(&self) -> u64 {
        self.access_ttl_seconds
    }

    /// 签发 access token，claims 包含 user_id、email、签发/过期时间。
    pub fn generate_access_token(
        &self,
        user_id: &str,
        email: &str,
    ) -> Result<IssuedAccessToken, AuthError> {
        let iat = now_epoch_seconds();
        let exp = iat + self.access_ttl_seconds as i64;
        let claims = AccessClaims {
            user_id: user_id.to_string(),
            email: email.to_string(),
            iat,
            exp,
            jti: Uuid::new_v4().to_string(),
        };
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| AuthError::Internal(err.to_string()))?;
        Ok(IssuedAccessToken {
            token,
            expires_at: exp,
        })
    }

    /// 生成 refresh token：32 字节系统随机数，URL-safe base64 编码。
    ///
    /// 不携带任何 claims，只能作为会话存储的查找键。
    pub fn generate_refresh_token(&self) -> String {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Base64Url::encode_string(&bytes)
    }

    /// 校验 access token 的签名、算法与过期时间。
    ///
    /// 只接受 HS256；算法被替换（含 `none`）、签名不符、格式错误、已过期一律为 `InvalidToken`。
    pub fn validate_access_token(&self, token: &str) -> Result<AccessClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        let decoded = jsonwebtoken::decode::<AccessClaims>(token, &self.decoding_key, &validation)
            .map_err(map_jwt_error)?;
        Ok(decoded.claims)
    }
}

/// 将 jwt 库错误映射为业务错误。
///
/// 过期与其他校验失败对外不做区分。
fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    tracing::debug!(error = %err, "access token rejected");
    AuthError::InvalidToken
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_tokens_are_url_safe_and_unique() {
        let codec = TokenCodec::new("secret", 900).expect("codec");
        let first = codec.generate_refresh_token();
        let second = codec.generate_refresh_token();
        assert_ne!(first, second);
        // 32 字节 → 44 个字符（含填充）
        assert_eq!(first.len(), 44);
        assert!(!first.contains('+') && !first.contains('/'));
        assert_eq!(Base64Url::decode_vec(&first).expect("decode").len(), 32);
    }

    #[test]
    fn empty_secret_is_configuration_error() {
        let result = TokenCodec::new("", 900);
        assert!(matches!(result, Err(AuthError::Configuration(_))));
    }

    #[test]
    fn access_tokens_issued_together_differ() {
        let codec = TokenCodec::new("secret", 900).expect("codec");
        let a = codec.generate_access_token("user-1", "a@x.com").expect("a");
        let b = codec.generate_access_token("user-1", "a@x.com").expect("b");
        assert_ne!(a.token, b.token);
    }
}
