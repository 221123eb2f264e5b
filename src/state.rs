use std::sync::Arc;

use crate::config;
use crate::db;
use crate::error;
use crate::options::{Options, Dependencies, PgOptionStore};
use crate::sec::authn::link::Linker;
use crate::sec::authn::session::{SessionStore, PgSessionStore};
use crate::sec::authn::wechat::{HttpProvider, Resolver};
use crate::user::{UserStore, PgUserStore};

pub struct Shared {
    sessions: Arc<dyn SessionStore>,
    options: Arc<Options>,
    users: Arc<dyn UserStore>,
    linker: Linker,
    session: config::Session,
}

pub type ArcShared = Arc<Shared>;

impl Shared {
    /// connect the stores and load the options table. the options are fully
    /// loaded before this returns
    pub async fn from_config(config: &config::Config) -> error::Result<Shared> {
        tracing::debug!("creating Shared state");

        let pool = db::from_config(config)?;

        let options = Arc::new(Options::new(
            Arc::new(PgOptionStore::new(pool.clone())),
            Dependencies {
                redis_enabled: config.settings.redis_enabled,
            }
        ));

        options.initialize().await?;

        let sessions = Arc::new(PgSessionStore::new(pool.clone()));
        let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool));
        let provider = HttpProvider::new(options.clone(), config.settings.wechat.timeout)?;
        let linker = Linker::new(
            options.clone(),
            Resolver::new(Arc::new(provider)),
            users.clone()
        );

        Ok(Shared::new(
            sessions,
            options,
            users,
            linker,
            config.settings.sec.session.clone()
        ))
    }

    pub fn new(
        sessions: Arc<dyn SessionStore>,
        options: Arc<Options>,
        users: Arc<dyn UserStore>,
        linker: Linker,
        session: config::Session,
    ) -> Self {
        Shared {
            sessions,
            options,
            users,
            linker,
            session,
        }
    }

    pub fn sessions(&self) -> &dyn SessionStore {
        self.sessions.as_ref()
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn linker(&self) -> &Linker {
        &self.linker
    }

    pub fn session(&self) -> &config::Session {
        &self.session
    }
}

impl AsRef<dyn SessionStore> for Shared {
    fn as_ref(&self) -> &(dyn SessionStore + 'static) {
        self.sessions.as_ref()
    }
}

impl AsRef<dyn UserStore> for Shared {
    fn as_ref(&self) -> &(dyn UserStore + 'static) {
        self.users.as_ref()
    }
}

impl std::fmt::Debug for Shared {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shared")
            .field("options", &self.options)
            .field("linker", &self.linker)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
