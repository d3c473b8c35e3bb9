//! 连接/会话协调核心
//!
//! 聚合在线状态表、房间成员表与消息路由，以及核心对外依赖的端口定义
//! （身份校验、历史存储、时钟）。

pub mod clock;
pub mod delivery;
pub mod error;
pub mod history;
pub mod identity;
pub mod presence;
pub mod rooms;
pub mod router;
pub mod session;

pub use clock::{Clock, SystemClock};
pub use delivery::ConnectionHandle;
pub use error::{AuthError, HistoryError};
pub use history::HistoryStore;
pub use identity::IdentityVerifier;
pub use presence::{PresenceEntry, PresenceTable};
pub use rooms::RoomRegistry;
pub use router::{MessageRouter, MessageRouterDependencies};
pub use session::ConnectionSession;
