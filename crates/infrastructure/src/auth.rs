//! JWT 身份校验
//!
//! 校验连接握手时出示的 bearer token，并把 claims 映射为稳定的用户身份。
//! 凭据签发（注册/登录）属于外部协作方；这里附带的 `issue_token`
//! 供登录服务和测试使用。

use async_trait::async_trait;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use application::{AuthError, IdentityVerifier};
use config::JwtConfig;
use domain::{Identity, UserId, Username};

/// JWT Claims 结构
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub id: String,
    pub username: String,
    pub exp: i64, // 过期时间 (Unix timestamp)
}

/// 基于 JWT (HS256) 的身份校验器
pub struct JwtIdentityVerifier {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtIdentityVerifier {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_ref());
        let decoding_key = DecodingKey::from_secret(config.secret.as_ref());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// 为指定身份签发 token
    pub fn issue_token(&self, identity: &Identity) -> Result<String, AuthError> {
        let now = chrono::Utc::now();
        let exp = now + chrono::Duration::hours(self.config.expiration_hours);

        let claims = Claims {
            id: identity.user_id.to_string(),
            username: identity.username.to_string(),
            exp: exp.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|err| AuthError::InvalidCredential(format!("token generation failed: {err}")))
    }
}

#[async_trait]
impl IdentityVerifier for JwtIdentityVerifier {
    async fn verify(&self, credential: &str) -> Result<Identity, AuthError> {
        if credential.is_empty() {
            return Err(AuthError::MissingCredential);
        }

        let data = decode::<Claims>(credential, &self.decoding_key, &Validation::default())
            .map_err(|err| AuthError::InvalidCredential(err.to_string()))?;

        let user_id = UserId::parse(data.claims.id)
            .map_err(|err| AuthError::InvalidCredential(err.to_string()))?;
        let username = Username::parse(data.claims.username)
            .map_err(|err| AuthError::InvalidCredential(err.to_string()))?;

        Ok(Identity::new(user_id, username))
    }
}
