//! 实时聊天系统核心领域模型
//!
//! 包含用户身份、消息记录、线协议事件等核心类型，以及相关的校验规则。

pub mod errors;
pub mod events;
pub mod identity;
pub mod message;
pub mod value_objects;

// 重新导出常用类型
pub use errors::*;
pub use events::*;
pub use identity::*;
pub use message::*;
pub use value_objects::*;
