use http::StatusCode;
use axum_core::response::{Response, IntoResponse};
use serde::{Serialize, Deserialize};
use strum::{AsRefStr as StrumAsRefStr};

use crate::reply::Reply;
use crate::response::{serialize_json, error_json};

#[derive(
    Debug, Clone, PartialEq, Eq,
    StrumAsRefStr,
    Serialize, Deserialize
)]
pub enum AuthKind {
    PermissionDenied,
    Unauthenticated,

    InvalidSession,
    SessionExpired,
    SessionNotFound,

    AccountDisabled,

    MechanismNotFound
}

impl std::fmt::Display for AuthKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self.as_ref(), f)
    }
}

impl From<&AuthKind> for StatusCode {
    fn from(kind: &AuthKind) -> Self {
        match kind {
            AuthKind::PermissionDenied |
            AuthKind::AccountDisabled => StatusCode::FORBIDDEN,
            AuthKind::Unauthenticated |
            AuthKind::InvalidSession |
            AuthKind::SessionExpired |
            AuthKind::SessionNotFound |
            AuthKind::MechanismNotFound => StatusCode::UNAUTHORIZED,
        }
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq,
    StrumAsRefStr,
    Serialize, Deserialize
)]
pub enum ExternalKind {
    InvalidCode,
    FeatureDisabled,

    ProviderUnavailable,
    MalformedResponse,
    ProviderRejected,
    CodeExpired,

    AlreadyBound,
}

impl std::fmt::Display for ExternalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self.as_ref(), f)
    }
}

impl From<&ExternalKind> for StatusCode {
    fn from(kind: &ExternalKind) -> Self {
        match kind {
            ExternalKind::InvalidCode |
            ExternalKind::ProviderRejected |
            ExternalKind::CodeExpired => StatusCode::BAD_REQUEST,
            ExternalKind::FeatureDisabled => StatusCode::FORBIDDEN,
            ExternalKind::ProviderUnavailable |
            ExternalKind::MalformedResponse => StatusCode::BAD_GATEWAY,
            ExternalKind::AlreadyBound => StatusCode::CONFLICT,
        }
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq,
    StrumAsRefStr,
    Serialize, Deserialize
)]
pub enum OptionKind {
    InvalidKey,
    DependencyDisabled,
}

impl std::fmt::Display for OptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self.as_ref(), f)
    }
}

impl From<&OptionKind> for StatusCode {
    fn from(kind: &OptionKind) -> Self {
        match kind {
            OptionKind::InvalidKey => StatusCode::BAD_REQUEST,
            OptionKind::DependencyDisabled => StatusCode::CONFLICT,
        }
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq,
    StrumAsRefStr,
    Serialize, Deserialize
)]
pub enum UserKind {
    NotFound,
}

impl std::fmt::Display for UserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self.as_ref(), f)
    }
}

impl From<&UserKind> for StatusCode {
    fn from(kind: &UserKind) -> Self {
        match kind {
            UserKind::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq,
    StrumAsRefStr,
    Serialize, Deserialize
)]
pub enum GeneralKind {
    InternalFailure,
    Timeout,

    NotFound,
    NoWork,

    InvalidHeaderValue,
    InvalidRequest,
}

impl std::fmt::Display for GeneralKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self.as_ref(), f)
    }
}

impl From<&GeneralKind> for StatusCode {
    fn from(kind: &GeneralKind) -> StatusCode {
        match kind {
            GeneralKind::InternalFailure => StatusCode::INTERNAL_SERVER_ERROR,
            GeneralKind::Timeout => StatusCode::REQUEST_TIMEOUT,
            GeneralKind::NotFound => StatusCode::NOT_FOUND,
            GeneralKind::NoWork |
            GeneralKind::InvalidHeaderValue |
            GeneralKind::InvalidRequest => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq,
    Serialize, Deserialize
)]
pub enum ApiErrorKind {
    General(GeneralKind),
    Auth(AuthKind),
    External(ExternalKind),
    Option(OptionKind),
    User(UserKind),
}

impl std::fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiErrorKind::General(v) => std::fmt::Display::fmt(v, f),
            ApiErrorKind::Auth(v) => std::fmt::Display::fmt(v, f),
            ApiErrorKind::External(v) => std::fmt::Display::fmt(v, f),
            ApiErrorKind::Option(v) => std::fmt::Display::fmt(v, f),
            ApiErrorKind::User(v) => std::fmt::Display::fmt(v, f),
        }
    }
}

impl From<GeneralKind> for ApiErrorKind {
    fn from(v: GeneralKind) -> Self {
        ApiErrorKind::General(v)
    }
}

impl From<AuthKind> for ApiErrorKind {
    fn from(v: AuthKind) -> Self {
        ApiErrorKind::Auth(v)
    }
}

impl From<ExternalKind> for ApiErrorKind {
    fn from(v: ExternalKind) -> Self {
        ApiErrorKind::External(v)
    }
}

impl From<OptionKind> for ApiErrorKind {
    fn from(v: OptionKind) -> Self {
        ApiErrorKind::Option(v)
    }
}

impl From<UserKind> for ApiErrorKind {
    fn from(v: UserKind) -> Self {
        ApiErrorKind::User(v)
    }
}

impl From<&ApiErrorKind> for StatusCode {
    fn from(kind: &ApiErrorKind) -> Self {
        match kind {
            ApiErrorKind::General(v) => v.into(),
            ApiErrorKind::Auth(v) => v.into(),
            ApiErrorKind::External(v) => v.into(),
            ApiErrorKind::Option(v) => v.into(),
            ApiErrorKind::User(v) => v.into(),
        }
    }
}

impl ApiErrorKind {
    /// the message given to a caller when nothing more specific is attached
    pub fn default_message(&self) -> &'static str {
        match self {
            ApiErrorKind::General(kind) => match kind {
                GeneralKind::InternalFailure => "internal failure",
                GeneralKind::Timeout => "request timed out",
                GeneralKind::NotFound => "not found",
                GeneralKind::NoWork => "nothing to do",
                GeneralKind::InvalidHeaderValue => "invalid header value",
                GeneralKind::InvalidRequest => "invalid request",
            },
            ApiErrorKind::Auth(kind) => match kind {
                AuthKind::PermissionDenied => "permission denied",
                AuthKind::Unauthenticated => "not logged in",
                AuthKind::InvalidSession => "invalid session",
                AuthKind::SessionExpired => "session expired",
                AuthKind::SessionNotFound => "session not found",
                AuthKind::AccountDisabled => "account has been disabled",
                AuthKind::MechanismNotFound => "no authentication provided",
            },
            ApiErrorKind::External(kind) => match kind {
                ExternalKind::InvalidCode => "invalid parameter",
                ExternalKind::FeatureDisabled => "wechat login and registration is disabled",
                ExternalKind::ProviderUnavailable => "failed to reach the wechat server",
                ExternalKind::MalformedResponse => "invalid response from the wechat server",
                ExternalKind::ProviderRejected => "wechat server rejected the code",
                ExternalKind::CodeExpired => "verification code is invalid or has expired",
                ExternalKind::AlreadyBound => "this wechat account is already bound",
            },
            ApiErrorKind::Option(kind) => match kind {
                OptionKind::InvalidKey => "invalid option key",
                OptionKind::DependencyDisabled => "required subsystem is not enabled",
            },
            ApiErrorKind::User(kind) => match kind {
                UserKind::NotFound => "user not found",
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Detail {
    Keys(Vec<String>),
}

impl Detail {
    pub fn with_key(key: impl Into<String>) -> Self {
        Detail::Keys(vec![key.into()])
    }
}

impl std::fmt::Display for Detail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Detail::Keys(list) => {
                let mut iter = list.iter();

                if let Some(first) = iter.next() {
                    write!(f, "{}", first)?;

                    while let Some(key) = iter.next() {
                        write!(f, ",{}", key)?;
                    }
                }
            },
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    kind: ApiErrorKind,
    detail: Option<Detail>,
    msg: Option<String>,
}

impl ApiError {
    pub fn new() -> Self {
        ApiError {
            kind: ApiErrorKind::General(GeneralKind::InternalFailure),
            detail: None,
            msg: None
        }
    }

    pub fn with_kind<K>(mut self, kind: K) -> Self
    where
        K: Into<ApiErrorKind>
    {
        self.kind = kind.into();
        self
    }

    pub fn with_detail(mut self, detail: Detail) -> Self {
        self.detail = Some(detail);
        self
    }

    pub fn with_message<M>(mut self, msg: M) -> Self
    where
        M: Into<String>
    {
        self.msg = Some(msg.into());
        self
    }

    pub fn kind(&self) -> &ApiErrorKind {
        &self.kind
    }

    pub fn detail(&self) -> Option<&Detail> {
        self.detail.as_ref()
    }

    pub fn message(&self) -> Option<&str> {
        self.msg.as_deref()
    }

    /// the reply a caller receives for this error
    pub fn to_reply(&self) -> Reply<()> {
        let message = match &self.msg {
            Some(msg) => msg.clone(),
            None => self.kind.default_message().to_owned(),
        };

        Reply::failure(message).with_kind(self.kind.to_string())
    }
}

impl std::default::Default for ApiError {
    fn default() -> Self {
        ApiError::new()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)?;

        if let Some(detail) = &self.detail {
            write!(f, ": {}", detail)?;
        }

        if let Some(msg) = &self.msg {
            write!(f, ": {}", msg)?;
        }

        Ok(())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from(&self.kind);

        match serialize_json(status, &self.to_reply()) {
            Ok(res) => res,
            Err(err) => {
                tracing::error!("ApiError serialization error {:?}", err);
                error_json()
            }
        }
    }
}

impl<K> From<K> for ApiError
where
    K: Into<ApiErrorKind>
{
    fn from(kind: K) -> Self {
        ApiError {
            kind: kind.into(),
            detail: None,
            msg: None
        }
    }
}

impl<K,M> From<(K, M)> for ApiError
where
    K: Into<ApiErrorKind>,
    M: Into<String>,
{
    fn from((kind, msg): (K, M)) -> Self {
        ApiError {
            kind: kind.into(),
            detail: None,
            msg: Some(msg.into())
        }
    }
}

impl<K> From<(K, Detail)> for ApiError
where
    K: Into<ApiErrorKind>
{
    fn from((kind, detail): (K, Detail)) -> Self {
        ApiError {
            kind: kind.into(),
            detail: Some(detail),
            msg: None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reply_uses_attached_message() {
        let err = ApiError::from((ExternalKind::ProviderRejected, "过期"));
        let reply = err.to_reply();

        assert!(!reply.success());
        assert_eq!(reply.message(), "过期");
        assert_eq!(reply.kind(), Some("ProviderRejected"));
    }

    #[test]
    fn reply_falls_back_to_kind_message() {
        let err = ApiError::from(ExternalKind::CodeExpired);
        let reply = err.to_reply();

        assert_eq!(reply.message(), "verification code is invalid or has expired");
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            StatusCode::from(&ApiErrorKind::from(ExternalKind::AlreadyBound)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            StatusCode::from(&ApiErrorKind::from(AuthKind::Unauthenticated)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            StatusCode::from(&ApiErrorKind::from(GeneralKind::InternalFailure)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
