pub type UserId = i64;

/// the provider defined identifier for an external account
pub type WeChatId = String;
