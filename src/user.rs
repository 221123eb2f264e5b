use async_trait::async_trait;
use gate_lib::ids;
use gate_lib::users::{Role, Status, WECHAT_USERNAME_PREFIX, WECHAT_DISPLAY_NAME};

use crate::db::StoreError;

mod pg;

pub use pg::PgUserStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: ids::UserId,
    pub username: String,
    pub display_name: String,
    pub role: Role,
    pub status: Status,
    pub wechat_id: Option<ids::WeChatId>,
}

impl User {
    pub fn is_enabled(&self) -> bool {
        self.status.is_enabled()
    }
}

impl From<User> for gate_api::users::User {
    fn from(user: User) -> Self {
        gate_api::users::User {
            id: user.id,
            username: user.username,
            display_name: user.display_name,
            role: user.role,
            status: user.status,
            wechat_id: user.wechat_id,
        }
    }
}

/// an account that has not been given an id yet
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub display_name: String,
    pub role: Role,
    pub status: Status,
    pub wechat_id: Option<ids::WeChatId>,
}

impl NewUser {
    /// the account provisioned on the first login with an unknown wechat
    /// identity
    pub fn from_wechat(wechat_id: ids::WeChatId) -> Self {
        let suffix = uuid::Uuid::new_v4().simple().to_string();

        NewUser {
            username: format!("{WECHAT_USERNAME_PREFIX}{suffix}"),
            display_name: WECHAT_DISPLAY_NAME.to_owned(),
            role: Role::Common,
            status: Status::Enabled,
            wechat_id: Some(wechat_id),
        }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn retrieve(&self, id: ids::UserId) -> Result<Option<User>, StoreError>;

    async fn retrieve_wechat_id(&self, wechat_id: &str) -> Result<Option<User>, StoreError>;

    /// fails with [`StoreError::Conflict`] if the username or wechat id is
    /// already taken
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError>;

    /// fails with [`StoreError::Conflict`] if another account already holds
    /// the wechat id
    async fn bind_wechat_id(&self, id: ids::UserId, wechat_id: &str) -> Result<(), StoreError>;
}
