//! 统一配置中心
//!
//! 提供应用的全局配置管理，包括：
//! - 服务监听地址
//! - JWT 认证
//! - 聊天默认房间与历史条数

use serde::{Deserialize, Serialize};
use std::env;

/// 全局应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 服务配置
    pub server: ServerConfig,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 聊天行为配置
    pub chat: ChatConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// JWT 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
}

/// 聊天行为配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// 新连接自动加入的默认房间
    pub default_room: String,
    /// 单次历史下发条数上限
    pub history_limit: u32,
}

impl AppConfig {
    /// 从环境变量加载配置
    /// JWT_SECRET 缺失时 panic，确保生产环境不会落到不安全的默认值
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: env::var("SERVER_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(8080),
            },
            jwt: JwtConfig {
                secret: env::var("JWT_SECRET")
                    .expect("JWT_SECRET environment variable is required for production safety"),
                expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(24),
            },
            chat: ChatConfig {
                default_room: env::var("CHAT_DEFAULT_ROOM")
                    .unwrap_or_else(|_| "general".to_string()),
                history_limit: env::var("CHAT_HISTORY_LIMIT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(50),
            },
        }
    }

    /// 从环境变量加载配置，开发环境版本
    /// 提供不安全的默认密钥，仅用于测试和开发
    pub fn from_env_with_defaults() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: env::var("SERVER_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(8080),
            },
            jwt: JwtConfig {
                secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                    "dev-secret-key-not-for-production-use-minimum-32-chars".to_string()
                }),
                expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(24),
            },
            chat: ChatConfig {
                default_room: env::var("CHAT_DEFAULT_ROOM")
                    .unwrap_or_else(|_| "general".to_string()),
                history_limit: env::var("CHAT_HISTORY_LIMIT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(50),
            },
        }
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 验证 JWT 密钥长度（至少256位/32字节）
        if self.jwt.secret.len() < 32 {
            return Err(ConfigError::InvalidJwtSecret(
                "JWT secret must be at least 32 characters long".to_string(),
            ));
        }

        if self.jwt.expiration_hours <= 0 {
            return Err(ConfigError::InvalidJwtSecret(
                "JWT expiration must be positive".to_string(),
            ));
        }

        // 验证默认房间
        if self.chat.default_room.trim().is_empty() {
            return Err(ConfigError::InvalidChatConfig(
                "default room cannot be empty".to_string(),
            ));
        }

        // 验证历史条数上限
        if self.chat.history_limit == 0 || self.chat.history_limit > 500 {
            return Err(ConfigError::InvalidChatConfig(
                "history limit must be within 1..=500".to_string(),
            ));
        }

        Ok(())
    }
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid JWT secret: {0}")]
    InvalidJwtSecret(String),
    #[error("Invalid server configuration: {0}")]
    InvalidServerConfig(String),
    #[error("Invalid chat configuration: {0}")]
    InvalidChatConfig(String),
    #[error("Environment variable error: {0}")]
    EnvVarError(#[from] std::env::VarError),
}

impl Default for AppConfig {
    /// 默认配置使用开发环境版本
    /// 注意：生产环境应该明确调用 from_env() 而不是依赖默认值
    fn default() -> Self {
        Self::from_env_with_defaults()
    }
}
