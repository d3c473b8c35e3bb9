use serde::{Deserialize, Serialize};

use crate::value_objects::{UserId, Username};

/// 经过认证的用户身份
///
/// 由身份校验器在连接建立时产生，连接存续期间不可变。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub username: Username,
}

impl Identity {
    pub fn new(user_id: UserId, username: Username) -> Self {
        Self { user_id, username }
    }
}
