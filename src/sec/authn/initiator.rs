use std::ops::Deref;

use async_trait::async_trait;
use axum::http::header::HeaderMap;
use axum::http::request::Parts;
use axum::extract::FromRequestParts;
use gate_api::error::AuthKind;
use gate_lib::sec::authn::SESSION_COOKIE;
use gate_lib::users::Role;

use crate::db::StoreError;
use crate::net::{cookie, error};
use crate::user::{User, UserStore};

use super::session::{Session, SessionStore, SessionToken};

/// the authenticated caller of a request
#[derive(Debug)]
pub struct Initiator {
    pub user: User,
    pub session: Session,
}

impl Initiator {
    pub fn require_role(&self, role: Role) -> Result<(), error::Error> {
        if self.user.role >= role {
            Ok(())
        } else {
            Err(error::Error::api(AuthKind::PermissionDenied))
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("no authentication mechanism was found")]
    MechanismNotFound,

    #[error("session id could not be decoded")]
    InvalidSession,

    #[error("session was not found")]
    SessionNotFound,

    #[error("session has expired")]
    SessionExpired,

    #[error("user was not found")]
    UserNotFound,

    #[error("account has been disabled")]
    AccountDisabled,

    #[error(transparent)]
    HeaderToStr(#[from] axum::http::header::ToStrError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub async fn lookup_token(
    sessions: &dyn SessionStore,
    users: &dyn UserStore,
    token: &SessionToken
) -> Result<Initiator, LookupError> {
    let Some(session) = Session::retrieve_token(sessions, token).await? else {
        return Err(LookupError::SessionNotFound);
    };

    if !session.is_active(&chrono::Utc::now()) {
        return Err(LookupError::SessionExpired);
    }

    let Some(user) = users.retrieve(session.user_id).await? else {
        return Err(LookupError::UserNotFound);
    };

    if !user.is_enabled() {
        return Err(LookupError::AccountDisabled);
    }

    Ok(Initiator { user, session })
}

pub async fn lookup_header_map(
    sessions: &dyn SessionStore,
    users: &dyn UserStore,
    headers: &HeaderMap
) -> Result<Initiator, LookupError> {
    let Some(found) = cookie::find(headers, SESSION_COOKIE)? else {
        return Err(LookupError::MechanismNotFound);
    };

    let token = SessionToken::decode(found)
        .map_err(|_| LookupError::InvalidSession)?;

    lookup_token(sessions, users, &token).await
}

#[async_trait]
impl<A, S> FromRequestParts<A> for Initiator
where
    A: Deref<Target = S> + Send + Sync,
    S: AsRef<dyn SessionStore> + AsRef<dyn UserStore> + Send + Sync,
{
    type Rejection = error::Error;

    async fn from_request_parts(parts: &mut Parts, state: &A) -> Result<Self, Self::Rejection> {
        // the router state is an Arc so reach through it for the stores
        let shared = state.deref();

        let sessions: &dyn SessionStore = shared.as_ref();
        let users: &dyn UserStore = shared.as_ref();

        Ok(lookup_header_map(sessions, users, &parts.headers).await?)
    }
}
