use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::response::{Response, IntoResponse};
use tracing::Level;

use gate_api::error::{AuthKind, ExternalKind, GeneralKind, OptionKind, UserKind};

pub use gate_api::error::{ApiErrorKind, ApiError};

use crate::db::StoreError;
use crate::options::OptionError;
use crate::sec::authn::initiator::LookupError;
use crate::sec::authn::link::LinkError;
use crate::sec::authn::session::SessionError;
use crate::sec::authn::wechat::ResolveError;

type BoxDynError = Box<dyn std::error::Error + Send + Sync>;

/// error handler for the fallible tower layers in front of the router
pub async fn handle_error(error: tower::BoxError) -> Response {
    let error = if error.is::<tower::timeout::error::Elapsed>() {
        Error::api(GeneralKind::Timeout)
    } else {
        Error::new().source(error)
    };

    error.into_response()
}

/// failure of a single request. `inner` is what the caller sees, `context`
/// and `src` are only logged
#[derive(Debug)]
pub struct Error {
    inner: ApiError,
    context: Option<String>,
    src: Option<BoxDynError>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn new() -> Self {
        Error {
            inner: Default::default(),
            context: None,
            src: None,
        }
    }

    pub fn api<T>(value: T) -> Self
    where
        T: Into<ApiError>
    {
        Error {
            inner: value.into(),
            context: None,
            src: None
        }
    }

    pub fn kind<K>(mut self, kind: K) -> Self
    where
        K: Into<ApiErrorKind>
    {
        self.inner = self.inner.with_kind(kind);
        self
    }

    pub fn context<C>(mut self, ctx: C) -> Self
    where
        C: Into<String>
    {
        self.context = Some(ctx.into());
        self
    }

    pub fn source<S>(mut self, src: S) -> Self
    where
        S: Into<BoxDynError>
    {
        self.src = Some(src.into());
        self
    }

    pub fn inner(&self) -> &ApiError {
        &self.inner
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "inner: {}", self.inner)?;

        if let Some(cxt) = &self.context {
            write!(f, "\ncxt: {cxt}")?;
        }

        if let Some(err) = &self.src {
            if f.alternate() {
                write!(f, "\nerr: {err:#?}")?;
            } else {
                write!(f, "\nerr: {err:?}")?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.src.as_ref().map(|v| & **v as _)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if let Some(err) = self.src.as_ref() {
            match &self.context {
                Some(cxt) => tracing::event!(
                    Level::ERROR,
                    "unhandled error when processing request: {cxt}\n{err:#?}"
                ),
                None => tracing::event!(
                    Level::ERROR,
                    "unhandled error when processing request: {err:#?}"
                ),
            }
        }

        self.inner.into_response()
    }
}

impl From<ApiError> for Error {
    fn from(api_err: ApiError) -> Self {
        Error::api(api_err)
    }
}

impl From<QueryRejection> for Error {
    fn from(err: QueryRejection) -> Self {
        Error::api((GeneralKind::InvalidRequest, err.body_text()))
            .source(err)
    }
}

impl From<JsonRejection> for Error {
    fn from(err: JsonRejection) -> Self {
        Error::api((GeneralKind::InvalidRequest, err.body_text()))
            .source(err)
    }
}

impl From<OptionError> for Error {
    fn from(err: OptionError) -> Self {
        match err {
            OptionError::DependencyDisabled { key, dependency } => Error::api((
                OptionKind::DependencyDisabled,
                format!("{dependency} must be enabled before {key} can be turned on"),
            )),
            OptionError::Store(err) => err.into(),
        }
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Error::new()
            .context("account or option store failure")
            .source(err)
    }
}

impl From<ResolveError> for Error {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::InvalidParameter => Error::api(ExternalKind::InvalidCode),
            ResolveError::Address(err) => Error::api(ExternalKind::ProviderUnavailable)
                .context("wechat server address is not a valid url")
                .source(err),
            ResolveError::Transport(err) => Error::api(ExternalKind::ProviderUnavailable)
                .source(err),
            ResolveError::Malformed(err) => Error::api(ExternalKind::MalformedResponse)
                .source(err),
            ResolveError::Rejected(msg) => Error::api((ExternalKind::ProviderRejected, msg)),
            ResolveError::Expired => Error::api(ExternalKind::CodeExpired),
        }
    }
}

impl From<LinkError> for Error {
    fn from(err: LinkError) -> Self {
        match err {
            LinkError::Resolve(err) => err.into(),
            LinkError::AlreadyBound => Error::api(ExternalKind::AlreadyBound),
            LinkError::UserNotFound => Error::api(UserKind::NotFound),
            LinkError::Store(err) => err.into(),
        }
    }
}

impl From<SessionError> for Error {
    fn from(err: SessionError) -> Self {
        Error::new()
            .context("failed to issue session")
            .source(err)
    }
}

impl From<LookupError> for Error {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::MechanismNotFound => Error::api(AuthKind::Unauthenticated),
            LookupError::InvalidSession => Error::api(AuthKind::InvalidSession),
            LookupError::SessionNotFound => Error::api(AuthKind::SessionNotFound),
            LookupError::SessionExpired => Error::api(AuthKind::SessionExpired),
            LookupError::UserNotFound => Error::api(UserKind::NotFound),
            LookupError::AccountDisabled => Error::api(AuthKind::AccountDisabled),
            LookupError::HeaderToStr(err) => Error::api(GeneralKind::InvalidHeaderValue)
                .source(err),
            LookupError::Store(err) => err.into(),
        }
    }
}

macro_rules! simple_from {
    ($e:path, $k:expr) => {
        impl From<$e> for Error {
            fn from(err: $e) -> Self {
                Error::new()
                    .kind($k)
                    .source(err)
            }
        }
    };
}

simple_from!(
    axum::http::header::InvalidHeaderValue,
    GeneralKind::InvalidHeaderValue
);

#[cfg(test)]
mod test {
    use axum::http::StatusCode;

    use super::*;

    fn kind_of(err: Error) -> ApiErrorKind {
        err.inner().kind().clone()
    }

    #[test]
    fn resolve_errors_map_to_external_kinds() {
        assert_eq!(
            kind_of(ResolveError::InvalidParameter.into()),
            ApiErrorKind::External(ExternalKind::InvalidCode)
        );
        assert_eq!(
            kind_of(ResolveError::Expired.into()),
            ApiErrorKind::External(ExternalKind::CodeExpired)
        );

        let rejected = Error::from(ResolveError::Rejected("过期".into()));

        assert_eq!(rejected.inner().message(), Some("过期"));
        assert_eq!(rejected.inner().to_reply().message(), "过期");
    }

    #[test]
    fn link_errors_map_to_kinds() {
        assert_eq!(
            kind_of(LinkError::AlreadyBound.into()),
            ApiErrorKind::External(ExternalKind::AlreadyBound)
        );
        assert_eq!(
            kind_of(LinkError::Store(StoreError::backend("down")).into()),
            ApiErrorKind::General(GeneralKind::InternalFailure)
        );
    }

    #[test]
    fn store_failures_hide_details() {
        let err = Error::from(StoreError::backend("connection refused"));
        let reply = err.inner().to_reply();

        assert!(!reply.success());
        assert_eq!(reply.message(), "internal failure");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn response_status_follows_kind() {
        let response = Error::from(LinkError::AlreadyBound).into_response();

        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = Error::from(OptionError::DependencyDisabled {
            key: "StatEnabled",
            dependency: "redis",
        }).into_response();

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

}
