use serde::{Serialize, Deserialize};

use crate::validation::check_control_whitespace;

pub const MAX_USERNAME_CHARS: usize = 128;

/// prefix given to usernames of accounts created through a wechat login
pub const WECHAT_USERNAME_PREFIX: &str = "wechat_";

pub const WECHAT_DISPLAY_NAME: &str = "WeChat User";

pub fn username_valid(given: &str) -> bool {
    !given.is_empty() && check_control_whitespace(given, Some(MAX_USERNAME_CHARS))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Guest,
    Common,
    Admin,
    Root,
}

impl Role {
    pub fn from_i16(v: i16) -> Option<Self> {
        match v {
            0 => Some(Role::Guest),
            1 => Some(Role::Common),
            10 => Some(Role::Admin),
            100 => Some(Role::Root),
            _ => None
        }
    }

    pub fn as_i16(&self) -> i16 {
        match self {
            Role::Guest => 0,
            Role::Common => 1,
            Role::Admin => 10,
            Role::Root => 100,
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Common
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Enabled,
    Disabled,
}

impl Status {
    pub fn from_i16(v: i16) -> Option<Self> {
        match v {
            1 => Some(Status::Enabled),
            2 => Some(Status::Disabled),
            _ => None
        }
    }

    pub fn as_i16(&self) -> i16 {
        match self {
            Status::Enabled => 1,
            Status::Disabled => 2,
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Status::Enabled)
    }
}
