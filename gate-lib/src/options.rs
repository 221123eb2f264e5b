use crate::validation::check_control_whitespace;

pub const MAX_KEY_CHARS: usize = 64;

/// keys ending with this suffix carry a numeric permission level
pub const PERMISSION_SUFFIX: &str = "Permission";

pub const FILE_UPLOAD_PERMISSION: &str = "FileUploadPermission";
pub const FILE_DOWNLOAD_PERMISSION: &str = "FileDownloadPermission";
pub const IMAGE_UPLOAD_PERMISSION: &str = "ImageUploadPermission";
pub const IMAGE_DOWNLOAD_PERMISSION: &str = "ImageDownloadPermission";

pub const PASSWORD_LOGIN_ENABLED: &str = "PasswordLoginEnabled";
pub const PASSWORD_REGISTER_ENABLED: &str = "PasswordRegisterEnabled";
pub const EMAIL_VERIFICATION_ENABLED: &str = "EmailVerificationEnabled";
pub const GITHUB_OAUTH_ENABLED: &str = "GitHubOAuthEnabled";
pub const WECHAT_AUTH_ENABLED: &str = "WeChatAuthEnabled";

/// only accepted when the redis backed subsystem is available
pub const STAT_ENABLED: &str = "StatEnabled";

pub const SMTP_SERVER: &str = "SMTPServer";
pub const SMTP_ACCOUNT: &str = "SMTPAccount";
pub const SMTP_TOKEN: &str = "SMTPToken";
pub const NOTICE: &str = "Notice";
pub const ABOUT: &str = "About";
pub const FOOTER: &str = "Footer";
pub const SERVER_ADDRESS: &str = "ServerAddress";
pub const GITHUB_CLIENT_ID: &str = "GitHubClientId";
pub const GITHUB_CLIENT_SECRET: &str = "GitHubClientSecret";
pub const WECHAT_SERVER_ADDRESS: &str = "WeChatServerAddress";
pub const WECHAT_SERVER_TOKEN: &str = "WeChatServerToken";
pub const WECHAT_ACCOUNT_QRCODE_IMAGE_URL: &str = "WeChatAccountQRCodeImageURL";

pub fn key_valid(given: &str) -> bool {
    !given.is_empty() && check_control_whitespace(given, Some(MAX_KEY_CHARS))
}

pub fn is_permission(key: &str) -> bool {
    key.ends_with(PERMISSION_SUFFIX)
}

/// credentials that are never handed back out through the option listing
pub fn is_secret(key: &str) -> bool {
    key.ends_with("Token") || key.ends_with("Secret")
}
