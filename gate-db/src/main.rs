use tracing_subscriber::{FmtSubscriber, EnvFilter};

mod error;
mod args;
mod conn;
mod run;

fn commands() -> clap::Command {
    use clap::{Command, Arg, ArgAction};

    Command::new("gate-db")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("setup")
                .about("creates the gate tables in an empty database")
                .arg(
                    Arg::new("rollback")
                        .long("rollback")
                        .action(ArgAction::SetTrue)
                        .help("run every statement then roll the transaction back")
                )
                .arg(args::setup_dir())
                .arg(args::connect())
                .arg(args::user())
                .arg(args::password())
                .arg(args::req_password())
                .arg(args::host())
                .arg(args::port())
                .arg(args::dbname())
        )
}

fn main() {
    use tokio::runtime::Builder;

    if let Err(err) = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init() {
        eprintln!("failed to initialize global tracing subscriber: {err}");
        return;
    }

    let matches = commands().get_matches();

    let rt = match Builder::new_current_thread()
        .enable_io()
        .enable_time()
        .build() {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("failed to start tokio runtime: {err}");
            return;
        }
    };

    if let Err(err) = rt.block_on(exec(&matches)) {
        eprintln!("{err}");

        let mut source = std::error::Error::source(&err);

        while let Some(inner) = source {
            eprintln!("  {inner}");
            source = inner.source();
        }

        std::process::exit(1);
    }
}

async fn exec(matches: &clap::ArgMatches) -> error::Result<()> {
    match matches.subcommand() {
        Some(("setup", setup_matches)) => run::setup(setup_matches).await,
        _ => Ok(())
    }
}
