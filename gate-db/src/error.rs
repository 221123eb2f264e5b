#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error")]
    Io(#[from] std::io::Error),

    #[error("postgres error")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("statement in {file} failed\n{statement}")]
    Statement {
        file: String,
        statement: String,
        #[source]
        source: tokio_postgres::Error,
    },

    #[error("no setup files found in {0}")]
    NoFiles(String),
}

pub type Result<T> = std::result::Result<T, Error>;
