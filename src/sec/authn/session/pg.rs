use async_trait::async_trait;
use deadpool_postgres::Pool;

use crate::db::StoreError;

use super::{Session, SessionStore};

#[derive(Debug)]
pub struct PgSessionStore {
    pool: Pool,
}

impl PgSessionStore {
    pub fn new(pool: Pool) -> Self {
        PgSessionStore { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, session: &Session) -> Result<(), StoreError> {
        let conn = self.pool.get().await?;

        conn.execute(
            "\
            insert into auth_session (token_hash, user_id, dropped, issued_on, expires) \
            values ($1, $2, $3, $4, $5)",
            &[
                &session.token_hash.as_bytes().as_slice(),
                &session.user_id,
                &session.dropped,
                &session.issued_on,
                &session.expires,
            ]
        ).await?;

        Ok(())
    }

    async fn retrieve(&self, token_hash: &blake3::Hash) -> Result<Option<Session>, StoreError> {
        let conn = self.pool.get().await?;

        let Some(row) = conn.query_opt(
            "\
            select auth_session.user_id, \
                   auth_session.dropped, \
                   auth_session.issued_on, \
                   auth_session.expires \
            from auth_session \
            where auth_session.token_hash = $1",
            &[&token_hash.as_bytes().as_slice()]
        ).await? else {
            return Ok(None);
        };

        Ok(Some(Session {
            token_hash: *token_hash,
            user_id: row.get(0),
            dropped: row.get(1),
            issued_on: row.get(2),
            expires: row.get(3),
        }))
    }
}
