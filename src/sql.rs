use tokio_postgres::{Error as PgError};
use tokio_postgres::error::SqlState;
use tokio_postgres::types::ToSql;

pub type ParamsArray<'a, const N: usize> = [&'a (dyn ToSql + Sync); N];

pub fn is_unique_violation(error: &PgError) -> bool {
    error.as_db_error()
        .map(|db_error| *db_error.code() == SqlState::UNIQUE_VIOLATION)
        .unwrap_or(false)
}

/// name of the violated constraint when the error is a unique violation
pub fn unique_constraint_error(error: &PgError) -> Option<&str> {
    let Some(db_error) = error.as_db_error() else {
        return None;
    };

    if *db_error.code() == SqlState::UNIQUE_VIOLATION {
        db_error.constraint()
    } else {
        None
    }
}
