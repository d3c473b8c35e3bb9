use async_trait::async_trait;
use domain::{MessageRecord, RoomName, UserId};

use crate::error::HistoryError;

/// 消息历史存储接口
///
/// 核心只依赖"追加 + 取最近 N 条"两种能力，具体存储引擎由基础设施层提供。
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// 房间最近消息，时间升序，最多 `limit` 条
    async fn recent_by_room(
        &self,
        room: &RoomName,
        limit: u32,
    ) -> Result<Vec<MessageRecord>, HistoryError>;

    /// 两名用户之间（任一方向）的最近私信，时间升序，最多 `limit` 条
    async fn recent_by_direct_pair(
        &self,
        user_a: &UserId,
        user_b: &UserId,
        limit: u32,
    ) -> Result<Vec<MessageRecord>, HistoryError>;

    /// 追加一条消息；缺失的时间戳由存储补齐，返回落盘后的记录
    async fn append(&self, record: MessageRecord) -> Result<MessageRecord, HistoryError>;
}
