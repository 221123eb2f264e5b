use std::path::{Path, PathBuf};

use clap::ArgMatches;

use crate::conn;
use crate::error;

/// every `.sql` file in the directory, in name order
fn setup_files(dir: &Path) -> error::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        if path.extension().is_some_and(|ext| ext == "sql") {
            files.push(path);
        }
    }

    files.sort();

    Ok(files)
}

/// splits on `;` and drops the empty pieces left by trailing separators
fn statements(sql: &str) -> impl Iterator<Item = &str> {
    sql.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

pub async fn run(args: &ArgMatches) -> error::Result<()> {
    let dir = args.get_one::<String>("dir")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("gate-db/setup/postgres"));

    let files = setup_files(&dir)?;

    if files.is_empty() {
        return Err(error::Error::NoFiles(dir.display().to_string()));
    }

    let mut client = conn::postgres(args).await?;
    let transaction = client.transaction().await?;
    let mut failure = None;

    'files: for path in &files {
        let sql = std::fs::read_to_string(path)?;

        tracing::info!("running {}", path.display());

        for statement in statements(&sql) {
            if let Err(source) = transaction.execute(statement, &[]).await {
                failure = Some(error::Error::Statement {
                    file: path.display().to_string(),
                    statement: statement.to_owned(),
                    source,
                });

                break 'files;
            }
        }
    }

    if let Some(err) = failure {
        transaction.rollback().await?;

        return Err(err);
    }

    if args.get_flag("rollback") {
        tracing::info!("rolling back changes");

        transaction.rollback().await?;
    } else {
        transaction.commit().await?;
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn statements_skip_blank() {
        let sql = "create table a (id int);\n\n create table b (id int);\n";
        let list: Vec<&str> = statements(sql).collect();

        assert_eq!(list, vec!["create table a (id int)", "create table b (id int)"]);
    }

    #[test]
    fn bundled_setup_files_are_found() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("setup/postgres");
        let files = setup_files(&dir).unwrap();

        assert!(!files.is_empty());
        assert!(files.iter().all(|p| p.extension().is_some_and(|e| e == "sql")));
    }
}
