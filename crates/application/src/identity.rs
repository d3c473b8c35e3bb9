use async_trait::async_trait;
use domain::Identity;

use crate::error::AuthError;

/// 身份校验器接口
///
/// 对连接建立时出示的不透明凭据做一次性校验，产出稳定的用户身份。
/// 纯校验、无副作用；未通过校验的连接不得处理任何事件。
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, credential: &str) -> Result<Identity, AuthError>;
}
