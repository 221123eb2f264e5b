use std::str::FromStr;

use clap::ArgMatches;
use tokio_postgres::{Client, Config, NoTls};

use crate::error;

fn config_from_args(args: &ArgMatches) -> error::Result<Config> {
    if let Some(connect) = args.get_one::<String>("connect") {
        return Ok(Config::from_str(connect)?);
    }

    let mut config = Config::new();

    // all of these carry defaults
    if let Some(user) = args.get_one::<String>("user") {
        config.user(user);

        if args.get_flag("req_password") {
            let given = rpassword::prompt_password(format!("{user} password: "))?;

            config.password(given.trim_end_matches(['\r', '\n']));
        }
    }

    if let Some(host) = args.get_one::<String>("host") {
        config.host(host);
    }

    if let Some(port) = args.get_one::<u16>("port") {
        config.port(*port);
    }

    if let Some(dbname) = args.get_one::<String>("dbname") {
        config.dbname(dbname);
    }

    if let Some(password) = args.get_one::<String>("password") {
        config.password(password);
    }

    Ok(config)
}

pub async fn postgres(args: &ArgMatches) -> error::Result<Client> {
    let (client, conn) = config_from_args(args)?
        .connect(NoTls)
        .await?;

    tokio::spawn(async move {
        if let Err(err) = conn.await {
            tracing::error!("postgres connection error: {err}");
        }
    });

    Ok(client)
}
