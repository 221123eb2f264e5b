use serde::{Serialize, Deserialize};

/// public view of the feature switches a login page needs
#[derive(Debug, Serialize, Deserialize)]
pub struct Status {
    pub password_login: bool,
    pub password_register: bool,
    pub email_verification: bool,
    pub github_oauth: bool,
    pub github_client_id: String,
    pub wechat_login: bool,
    pub wechat_qrcode: String,
    pub server_address: String,
    pub footer: String,
}
