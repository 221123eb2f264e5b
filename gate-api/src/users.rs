use gate_lib::ids;
use gate_lib::users::{Role, Status};

use serde::{Serialize, Deserialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct User {
    pub id: ids::UserId,
    pub username: String,
    pub display_name: String,
    pub role: Role,
    pub status: Status,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wechat_id: Option<ids::WeChatId>,
}
