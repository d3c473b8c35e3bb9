//! 基础设施适配器
//!
//! 核心端口的具体实现：JWT 身份校验、内存消息历史存储。

pub mod auth;
pub mod history;

pub use auth::{Claims, JwtIdentityVerifier};
pub use history::MemoryHistoryStore;
