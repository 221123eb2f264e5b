use clap::{Arg, ArgAction, value_parser};

pub fn connect() -> Arg {
    Arg::new("connect")
        .short('c')
        .long("connect")
        .action(ArgAction::Set)
        .help("postgres connection string")
        .conflicts_with_all(["user", "password", "req_password", "host", "port", "dbname"])
}

pub fn user() -> Arg {
    Arg::new("user")
        .short('u')
        .long("user")
        .action(ArgAction::Set)
        .default_value("postgres")
        .help("postgres user")
}

pub fn password() -> Arg {
    Arg::new("password")
        .short('P')
        .long("password")
        .action(ArgAction::Set)
        .help("postgres password")
        .conflicts_with("req_password")
}

pub fn req_password() -> Arg {
    Arg::new("req_password")
        .long("req-password")
        .action(ArgAction::SetTrue)
        .help("prompt for the password before connecting")
}

pub fn host() -> Arg {
    Arg::new("host")
        .long("host")
        .action(ArgAction::Set)
        .default_value("localhost")
        .help("postgres host")
}

pub fn port() -> Arg {
    Arg::new("port")
        .short('p')
        .long("port")
        .action(ArgAction::Set)
        .default_value("5432")
        .value_parser(value_parser!(u16))
        .help("postgres port")
}

pub fn dbname() -> Arg {
    Arg::new("dbname")
        .long("dbname")
        .action(ArgAction::Set)
        .default_value("gate")
        .help("postgres database name")
}

pub fn setup_dir() -> Arg {
    Arg::new("dir")
        .short('d')
        .long("dir")
        .action(ArgAction::Set)
        .default_value("gate-db/setup/postgres")
        .help("directory holding the setup sql files")
}
