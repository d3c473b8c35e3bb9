use thiserror::Error;

/// 身份校验失败
///
/// 覆盖凭据缺失、格式错误、签名或过期校验失败；
/// 任一情况连接都在进入会话生命周期之前被终止。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing credential")]
    MissingCredential,
    #[error("invalid credential: {0}")]
    InvalidCredential(String),
}

/// 历史存储错误
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("storage error: {message}")]
    Storage { message: String },
}

impl HistoryError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}
