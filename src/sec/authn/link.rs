//! ties wechat identities to local accounts.
//!
//! a wechat id is held by at most one account. login reuses or creates the
//! account holding the id while bind refuses any id that is already held,
//! even by the account asking for the bind.

use std::sync::Arc;

use gate_lib::ids;

use crate::db::StoreError;
use crate::options::Options;
use crate::user::{User, NewUser, UserStore};

use super::wechat::{Resolver, ResolveError};

#[derive(Debug)]
pub enum Login {
    /// wechat login and registration is turned off
    Disabled,
    Banned(User),
    Granted(User),
}

#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("wechat id is already bound to an account")]
    AlreadyBound,

    #[error("user was not found")]
    UserNotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct Linker {
    options: Arc<Options>,
    resolver: Resolver,
    users: Arc<dyn UserStore>,
}

impl Linker {
    pub fn new(options: Arc<Options>, resolver: Resolver, users: Arc<dyn UserStore>) -> Self {
        Linker {
            options,
            resolver,
            users,
        }
    }

    pub async fn login_or_register(&self, code: &str) -> Result<Login, LinkError> {
        if !self.options.wechat_auth_enabled() {
            return Ok(Login::Disabled);
        }

        let wechat_id = self.resolver.resolve(code).await?;

        let user = match self.users.retrieve_wechat_id(&wechat_id).await? {
            Some(found) => found,
            None => self.register(wechat_id).await?,
        };

        if !user.is_enabled() {
            tracing::info!(user_id = user.id, "wechat login refused for disabled account");

            return Ok(Login::Banned(user));
        }

        Ok(Login::Granted(user))
    }

    async fn register(&self, wechat_id: ids::WeChatId) -> Result<User, LinkError> {
        let new_user = NewUser::from_wechat(wechat_id.clone());

        match self.users.create(new_user).await {
            Ok(created) => {
                tracing::info!(user_id = created.id, "registered account from wechat login");

                Ok(created)
            }
            Err(StoreError::Conflict(constraint)) => {
                // a concurrent login for the same wechat id won the insert
                tracing::debug!(?constraint, "wechat registration conflicted, re-fetching");

                match self.users.retrieve_wechat_id(&wechat_id).await? {
                    Some(found) => Ok(found),
                    None => Err(LinkError::Store(StoreError::Conflict(constraint))),
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    /// attach the wechat id behind `code` to the given account
    pub async fn bind(&self, user_id: ids::UserId, code: &str) -> Result<User, LinkError> {
        let wechat_id = self.resolver.resolve(code).await?;

        if self.users.retrieve_wechat_id(&wechat_id).await?.is_some() {
            return Err(LinkError::AlreadyBound);
        }

        let Some(mut user) = self.users.retrieve(user_id).await? else {
            return Err(LinkError::UserNotFound);
        };

        match self.users.bind_wechat_id(user.id, &wechat_id).await {
            Ok(()) => {}
            Err(StoreError::Conflict(_)) => return Err(LinkError::AlreadyBound),
            Err(err) => return Err(err.into()),
        }

        user.wechat_id = Some(wechat_id);

        tracing::info!(user_id = user.id, "bound wechat id to account");

        Ok(user)
    }
}

impl std::fmt::Debug for Linker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Linker")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}
