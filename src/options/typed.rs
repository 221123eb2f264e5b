use std::collections::HashMap;

use gate_lib::options as keys;

/// pre-parsed values for the options the process reads on every request
#[derive(Debug, Clone, PartialEq)]
pub struct Typed {
    pub file_upload_permission: i64,
    pub file_download_permission: i64,
    pub image_upload_permission: i64,
    pub image_download_permission: i64,

    pub password_login_enabled: bool,
    pub password_register_enabled: bool,
    pub email_verification_enabled: bool,
    pub github_oauth_enabled: bool,
    pub wechat_auth_enabled: bool,

    pub smtp_server: String,
    pub smtp_account: String,
    pub smtp_token: String,
    pub server_address: String,
    pub github_client_id: String,
    pub github_client_secret: String,
    pub footer: String,
    pub wechat_server_address: String,
    pub wechat_server_token: String,
    pub wechat_account_qrcode_image_url: String,
}

impl Default for Typed {
    fn default() -> Self {
        Typed {
            file_upload_permission: 0,
            file_download_permission: 0,
            image_upload_permission: 0,
            image_download_permission: 0,

            password_login_enabled: true,
            password_register_enabled: true,
            email_verification_enabled: false,
            github_oauth_enabled: false,
            wechat_auth_enabled: false,

            smtp_server: String::new(),
            smtp_account: String::new(),
            smtp_token: String::new(),
            server_address: String::new(),
            github_client_id: String::new(),
            github_client_secret: String::new(),
            footer: String::new(),
            wechat_server_address: String::new(),
            wechat_server_token: String::new(),
            wechat_account_qrcode_image_url: String::new(),
        }
    }
}

impl Typed {
    /// the string form of every typed field plus the free text keys that
    /// start out empty
    pub fn default_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();

        for key in [
            keys::FILE_UPLOAD_PERMISSION,
            keys::FILE_DOWNLOAD_PERMISSION,
            keys::IMAGE_UPLOAD_PERMISSION,
            keys::IMAGE_DOWNLOAD_PERMISSION,
        ] {
            map.insert(key.to_owned(), self.permission(key).unwrap_or(0).to_string());
        }

        for key in [
            keys::PASSWORD_LOGIN_ENABLED,
            keys::PASSWORD_REGISTER_ENABLED,
            keys::EMAIL_VERIFICATION_ENABLED,
            keys::GITHUB_OAUTH_ENABLED,
            keys::WECHAT_AUTH_ENABLED,
        ] {
            map.insert(key.to_owned(), self.flag(key).unwrap_or(false).to_string());
        }

        for key in [
            keys::SMTP_SERVER,
            keys::SMTP_ACCOUNT,
            keys::SMTP_TOKEN,
            keys::SERVER_ADDRESS,
            keys::GITHUB_CLIENT_ID,
            keys::GITHUB_CLIENT_SECRET,
            keys::FOOTER,
            keys::WECHAT_SERVER_ADDRESS,
            keys::WECHAT_SERVER_TOKEN,
            keys::WECHAT_ACCOUNT_QRCODE_IMAGE_URL,
        ] {
            map.insert(key.to_owned(), self.text(key).unwrap_or_default().to_owned());
        }

        map.insert(keys::NOTICE.to_owned(), String::new());
        map.insert(keys::ABOUT.to_owned(), String::new());

        map
    }

    /// project a new value onto the typed fields. keys without a typed
    /// field are ignored
    pub fn apply(&mut self, key: &str, value: &str) {
        if keys::is_permission(key) {
            let level = value.parse::<i64>().unwrap_or(0);

            if let Some(field) = self.permission_mut(key) {
                *field = level;
            }

            return;
        }

        if let Some(field) = self.flag_mut(key) {
            *field = value == "true";
        } else if let Some(field) = self.text_mut(key) {
            *field = value.to_owned();
        }
    }

    pub fn permission(&self, key: &str) -> Option<i64> {
        match key {
            keys::FILE_UPLOAD_PERMISSION => Some(self.file_upload_permission),
            keys::FILE_DOWNLOAD_PERMISSION => Some(self.file_download_permission),
            keys::IMAGE_UPLOAD_PERMISSION => Some(self.image_upload_permission),
            keys::IMAGE_DOWNLOAD_PERMISSION => Some(self.image_download_permission),
            _ => None
        }
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        match key {
            keys::PASSWORD_LOGIN_ENABLED => Some(self.password_login_enabled),
            keys::PASSWORD_REGISTER_ENABLED => Some(self.password_register_enabled),
            keys::EMAIL_VERIFICATION_ENABLED => Some(self.email_verification_enabled),
            keys::GITHUB_OAUTH_ENABLED => Some(self.github_oauth_enabled),
            keys::WECHAT_AUTH_ENABLED => Some(self.wechat_auth_enabled),
            _ => None
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        let value = match key {
            keys::SMTP_SERVER => &self.smtp_server,
            keys::SMTP_ACCOUNT => &self.smtp_account,
            keys::SMTP_TOKEN => &self.smtp_token,
            keys::SERVER_ADDRESS => &self.server_address,
            keys::GITHUB_CLIENT_ID => &self.github_client_id,
            keys::GITHUB_CLIENT_SECRET => &self.github_client_secret,
            keys::FOOTER => &self.footer,
            keys::WECHAT_SERVER_ADDRESS => &self.wechat_server_address,
            keys::WECHAT_SERVER_TOKEN => &self.wechat_server_token,
            keys::WECHAT_ACCOUNT_QRCODE_IMAGE_URL => &self.wechat_account_qrcode_image_url,
            _ => return None
        };

        Some(value.as_str())
    }

    fn permission_mut(&mut self, key: &str) -> Option<&mut i64> {
        match key {
            keys::FILE_UPLOAD_PERMISSION => Some(&mut self.file_upload_permission),
            keys::FILE_DOWNLOAD_PERMISSION => Some(&mut self.file_download_permission),
            keys::IMAGE_UPLOAD_PERMISSION => Some(&mut self.image_upload_permission),
            keys::IMAGE_DOWNLOAD_PERMISSION => Some(&mut self.image_download_permission),
            _ => None
        }
    }

    fn flag_mut(&mut self, key: &str) -> Option<&mut bool> {
        match key {
            keys::PASSWORD_LOGIN_ENABLED => Some(&mut self.password_login_enabled),
            keys::PASSWORD_REGISTER_ENABLED => Some(&mut self.password_register_enabled),
            keys::EMAIL_VERIFICATION_ENABLED => Some(&mut self.email_verification_enabled),
            keys::GITHUB_OAUTH_ENABLED => Some(&mut self.github_oauth_enabled),
            keys::WECHAT_AUTH_ENABLED => Some(&mut self.wechat_auth_enabled),
            _ => None
        }
    }

    fn text_mut(&mut self, key: &str) -> Option<&mut String> {
        match key {
            keys::SMTP_SERVER => Some(&mut self.smtp_server),
            keys::SMTP_ACCOUNT => Some(&mut self.smtp_account),
            keys::SMTP_TOKEN => Some(&mut self.smtp_token),
            keys::SERVER_ADDRESS => Some(&mut self.server_address),
            keys::GITHUB_CLIENT_ID => Some(&mut self.github_client_id),
            keys::GITHUB_CLIENT_SECRET => Some(&mut self.github_client_secret),
            keys::FOOTER => Some(&mut self.footer),
            keys::WECHAT_SERVER_ADDRESS => Some(&mut self.wechat_server_address),
            keys::WECHAT_SERVER_TOKEN => Some(&mut self.wechat_server_token),
            keys::WECHAT_ACCOUNT_QRCODE_IMAGE_URL => Some(&mut self.wechat_account_qrcode_image_url),
            _ => None
        }
    }
}

/// value types that can be read from the typed projection
pub trait FromTyped: Sized {
    fn from_typed(typed: &Typed, key: &str) -> Option<Self>;
}

impl FromTyped for bool {
    fn from_typed(typed: &Typed, key: &str) -> Option<Self> {
        typed.flag(key)
    }
}

impl FromTyped for i64 {
    fn from_typed(typed: &Typed, key: &str) -> Option<Self> {
        typed.permission(key)
    }
}

impl FromTyped for String {
    fn from_typed(typed: &Typed, key: &str) -> Option<Self> {
        typed.text(key).map(ToOwned::to_owned)
    }
}
