use deadpool_postgres::{Pool, Runtime, ManagerConfig, RecyclingMethod};
use tokio_postgres::NoTls;

use crate::config;
use crate::error;
use crate::sql;

pub type BoxDynError = Box<dyn std::error::Error + Send + Sync>;

pub fn from_config(config: &config::Config) -> error::Result<Pool> {
    tracing::debug!("creating database pool");

    let db = &config.settings.db;
    let mut pg_config = deadpool_postgres::Config::new();
    pg_config.user = Some(db.user.clone());
    pg_config.password = db.password.clone();
    pg_config.host = Some(db.host.clone());
    pg_config.port = Some(db.port);
    pg_config.dbname = Some(db.dbname.clone());
    pg_config.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });

    Ok(pg_config.create_pool(Some(Runtime::Tokio1), NoTls)?)
}

/// failures from the durable stores behind the option cache and accounts
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// a uniqueness constraint rejected the write. carries the constraint
    /// name when the database reports one
    #[error("unique constraint violated: {}", .0.as_deref().unwrap_or("unknown"))]
    Conflict(Option<String>),

    #[error(transparent)]
    Backend(BoxDynError),
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: Into<BoxDynError>
    {
        StoreError::Backend(err.into())
    }
}

impl From<tokio_postgres::Error> for StoreError {
    fn from(err: tokio_postgres::Error) -> Self {
        if sql::is_unique_violation(&err) {
            StoreError::Conflict(sql::unique_constraint_error(&err).map(ToOwned::to_owned))
        } else {
            StoreError::Backend(Box::new(err))
        }
    }
}

impl From<deadpool_postgres::PoolError> for StoreError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        StoreError::Backend(Box::new(err))
    }
}
