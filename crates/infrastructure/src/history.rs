//! 内存实现的消息历史存储
//!
//! 单进程内的默认实现，追加顺序即时间顺序。
//! 持久化引擎属于外部协作方，按同一接口接入即可替换。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use application::{Clock, HistoryError, HistoryStore};
use domain::{MessageRecord, RoomName, UserId};

pub struct MemoryHistoryStore {
    clock: Arc<dyn Clock>,
    records: RwLock<Vec<MessageRecord>>,
}

impl MemoryHistoryStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            records: RwLock::new(Vec::new()),
        }
    }

    fn tail(matching: Vec<MessageRecord>, limit: u32) -> Vec<MessageRecord> {
        let skip = matching.len().saturating_sub(limit as usize);
        matching.into_iter().skip(skip).collect()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn recent_by_room(
        &self,
        room: &RoomName,
        limit: u32,
    ) -> Result<Vec<MessageRecord>, HistoryError> {
        let records = self.records.read().await;
        let matching = records
            .iter()
            .filter(|record| record.room() == Some(room))
            .cloned()
            .collect();
        Ok(Self::tail(matching, limit))
    }

    async fn recent_by_direct_pair(
        &self,
        user_a: &UserId,
        user_b: &UserId,
        limit: u32,
    ) -> Result<Vec<MessageRecord>, HistoryError> {
        let records = self.records.read().await;
        let matching = records
            .iter()
            .filter(|record| record.is_direct_between(user_a, user_b))
            .cloned()
            .collect();
        Ok(Self::tail(matching, limit))
    }

    async fn append(&self, mut record: MessageRecord) -> Result<MessageRecord, HistoryError> {
        if record.created_at.is_none() {
            record.created_at = Some(self.clock.now());
        }
        let mut records = self.records.write().await;
        records.push(record.clone());
        Ok(record)
    }
}
