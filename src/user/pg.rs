use async_trait::async_trait;
use deadpool_postgres::Pool;
use gate_lib::ids;
use gate_lib::users::{Role, Status};
use tokio_postgres::Row;

use crate::db::StoreError;

use super::{User, NewUser, UserStore};

#[derive(Debug)]
pub struct PgUserStore {
    pool: Pool,
}

impl PgUserStore {
    pub fn new(pool: Pool) -> Self {
        PgUserStore { pool }
    }
}

fn user_from_row(row: &Row) -> Result<User, StoreError> {
    let Some(role) = Role::from_i16(row.get(3)) else {
        return Err(StoreError::backend("invalid role returned from database for user"));
    };

    let Some(status) = Status::from_i16(row.get(4)) else {
        return Err(StoreError::backend("invalid status returned from database for user"));
    };

    Ok(User {
        id: row.get(0),
        username: row.get(1),
        display_name: row.get(2),
        role,
        status,
        wechat_id: row.get(5),
    })
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn retrieve(&self, id: ids::UserId) -> Result<Option<User>, StoreError> {
        let conn = self.pool.get().await?;

        if let Some(row) = conn.query_opt(
            "\
            select users.id, \
                   users.username, \
                   users.display_name, \
                   users.role, \
                   users.status, \
                   users.wechat_id \
            from users \
            where users.id = $1",
            &[&id]
        ).await? {
            Ok(Some(user_from_row(&row)?))
        } else {
            Ok(None)
        }
    }

    async fn retrieve_wechat_id(&self, wechat_id: &str) -> Result<Option<User>, StoreError> {
        let conn = self.pool.get().await?;

        if let Some(row) = conn.query_opt(
            "\
            select users.id, \
                   users.username, \
                   users.display_name, \
                   users.role, \
                   users.status, \
                   users.wechat_id \
            from users \
            where users.wechat_id = $1",
            &[&wechat_id]
        ).await? {
            Ok(Some(user_from_row(&row)?))
        } else {
            Ok(None)
        }
    }

    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let conn = self.pool.get().await?;
        let role = new_user.role.as_i16();
        let status = new_user.status.as_i16();

        let row = conn.query_one(
            "\
            insert into users (username, display_name, role, status, wechat_id) \
            values ($1, $2, $3, $4, $5) \
            returning id",
            &[
                &new_user.username,
                &new_user.display_name,
                &role,
                &status,
                &new_user.wechat_id,
            ]
        ).await?;

        Ok(User {
            id: row.get(0),
            username: new_user.username,
            display_name: new_user.display_name,
            role: new_user.role,
            status: new_user.status,
            wechat_id: new_user.wechat_id,
        })
    }

    async fn bind_wechat_id(&self, id: ids::UserId, wechat_id: &str) -> Result<(), StoreError> {
        let conn = self.pool.get().await?;

        let updated = conn.execute(
            "update users set wechat_id = $2 where id = $1",
            &[&id, &wechat_id]
        ).await?;

        if updated == 0 {
            return Err(StoreError::backend(format!("no user found for id {id}")));
        }

        Ok(())
    }
}
