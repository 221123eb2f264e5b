use async_trait::async_trait;
use deadpool_postgres::Pool;
use futures::TryStreamExt;

use crate::db::StoreError;
use crate::sql;

/// the durable table that every option write goes through first
#[async_trait]
pub trait OptionStore: Send + Sync {
    async fn all(&self) -> Result<Vec<(String, String)>, StoreError>;

    /// update the row for `key` if it exists, otherwise insert it
    async fn upsert(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[derive(Debug)]
pub struct PgOptionStore {
    pool: Pool,
}

impl PgOptionStore {
    pub fn new(pool: Pool) -> Self {
        PgOptionStore { pool }
    }
}

#[async_trait]
impl OptionStore for PgOptionStore {
    async fn all(&self) -> Result<Vec<(String, String)>, StoreError> {
        let conn = self.pool.get().await?;
        let params: sql::ParamsArray<0> = [];

        let result = conn.query_raw(
            "select key, value from options",
            params
        ).await?;

        futures::pin_mut!(result);

        let mut rows = Vec::new();

        while let Some(row) = result.try_next().await? {
            rows.push((row.get(0), row.get(1)));
        }

        Ok(rows)
    }

    async fn upsert(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let conn = self.pool.get().await?;

        let _ = conn.execute(
            "\
            insert into options (key, value) values ($1, $2) \
            on conflict (key) do update \
            set value = excluded.value",
            &[&key, &value]
        ).await?;

        Ok(())
    }
}
