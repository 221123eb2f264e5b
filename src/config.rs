use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::net::{SocketAddr, IpAddr, Ipv6Addr};
use std::path::{Path, PathBuf, Component};
use std::time::Duration;

use clap::Parser;

use crate::error::{self, Context};

mod shape;

const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// a config file to load. may be given multiple times, later files
    /// override earlier ones
    #[arg(long)]
    config: Vec<PathBuf>
}

#[derive(Debug)]
pub struct Config {
    pub settings: Settings,
}

pub fn get_config() -> error::Result<Config> {
    Config::from_args(CliArgs::parse())
}

impl Config {
    pub fn from_args(args: CliArgs) -> error::Result<Self> {
        let cwd = std::env::current_dir()
            .context("failed to retrieve the current working directory")?;
        let mut settings = Settings::default();

        for given in args.config {
            let path = if given.is_absolute() {
                given
            } else {
                normalize(cwd.join(given))
            };

            tracing::debug!("loading config file \"{}\"", path.display());

            let loaded = load_file(&path)?;

            settings.merge(&Origin::root(&path), loaded)?;
        }

        if settings.listeners.is_empty() {
            settings.listeners.insert("default".into(), Listener::default());
        }

        tracing::debug!("{settings:#?}");

        Ok(Config { settings })
    }
}

fn load_file(path: &Path) -> error::Result<shape::Settings> {
    let ext = path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .context(format!("config file has no usable extension: \"{}\"", path.display()))?;

    let file = std::fs::File::open(path)
        .context(format!("failed to open config file: \"{}\"", path.display()))?;
    let reader = std::io::BufReader::new(file);

    match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_reader(reader)
            .context(format!("invalid yaml in config file: \"{}\"", path.display())),
        "json" => serde_json::from_reader(reader)
            .context(format!("invalid json in config file: \"{}\"", path.display())),
        _ => Err(error::Error::new(format!(
            "unsupported config file type: \"{}\"", path.display()
        )))
    }
}

/// where a value being merged came from. used to point at the offending
/// file and key when a value is rejected
struct Origin<'a> {
    file: &'a Path,
    key: String,
}

impl<'a> Origin<'a> {
    fn root(file: &'a Path) -> Self {
        Origin {
            file,
            key: String::from("settings"),
        }
    }

    fn child(&self, name: impl Display) -> Origin<'a> {
        Origin {
            file: self.file,
            key: format!("{}.{name}", self.key),
        }
    }

    fn invalid(&self, reason: impl Display) -> error::Error {
        error::Error::new(format!("{self} {reason}"))
    }
}

impl Display for Origin<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (file: \"{}\")", self.key, self.file.display())
    }
}

#[derive(Debug)]
pub struct Settings {
    pub id: i64,
    pub listeners: HashMap<String, Listener>,
    pub sec: Sec,
    pub wechat: WeChat,
    pub db: Db,

    /// whether the redis backed subsystem is available to this process.
    /// options that depend on it are refused while this is false
    pub redis_enabled: bool,
}

impl Settings {
    fn merge(&mut self, origin: &Origin<'_>, given: shape::Settings) -> error::Result<()> {
        if let Some(id) = given.id {
            self.id = id;
        }

        for (name, listener) in given.listeners.unwrap_or_default() {
            let merged = Listener::parse(&origin.child(format!("listeners.\"{name}\"")), listener)?;

            self.listeners.insert(name, merged);
        }

        if let Some(sec) = given.sec {
            if let Some(session) = sec.session {
                self.sec.session.merge(session);
            }
        }

        if let Some(wechat) = given.wechat {
            self.wechat.merge(&origin.child("wechat"), wechat)?;
        }

        if let Some(db) = given.db {
            self.db.merge(db);
        }

        if let Some(redis_enabled) = given.redis_enabled {
            self.redis_enabled = redis_enabled;
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            id: 1,
            listeners: HashMap::new(),
            sec: Sec::default(),
            wechat: WeChat::default(),
            db: Db::default(),
            redis_enabled: false,
        }
    }
}

#[derive(Debug)]
pub struct Listener {
    pub addr: SocketAddr,
}

impl Listener {
    /// accepts a full socket address or a bare ip that gets the default port
    fn parse(origin: &Origin<'_>, given: shape::Listener) -> error::Result<Self> {
        let addr = match given.addr.parse::<SocketAddr>() {
            Ok(addr) => addr,
            Err(_) => match given.addr.parse::<IpAddr>() {
                Ok(ip) => SocketAddr::new(ip, DEFAULT_PORT),
                Err(_) => return Err(origin.child("addr").invalid(
                    format!("is not a valid address: \"{}\"", given.addr)
                )),
            }
        };

        Ok(Listener { addr })
    }
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            addr: SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), DEFAULT_PORT),
        }
    }
}

#[derive(Debug, Default)]
pub struct Sec {
    pub session: Session,
}

/// how the session cookie is sent back to clients
#[derive(Debug, Clone)]
pub struct Session {
    pub secure: bool,
    pub domain: Option<String>,
}

impl Session {
    fn merge(&mut self, given: shape::Session) {
        if let Some(secure) = given.secure {
            self.secure = secure;
        }

        if given.domain.is_some() {
            self.domain = given.domain;
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Session {
            secure: true,
            domain: None,
        }
    }
}

#[derive(Debug)]
pub struct WeChat {
    /// upper bound for a single request to the wechat server
    pub timeout: Duration,
}

impl WeChat {
    fn merge(&mut self, origin: &Origin<'_>, given: shape::WeChat) -> error::Result<()> {
        match given.timeout {
            Some(0) => Err(origin.child("timeout").invalid("must be greater than 0")),
            Some(secs) => {
                self.timeout = Duration::from_secs(secs);
                Ok(())
            }
            None => Ok(())
        }
    }
}

impl Default for WeChat {
    fn default() -> Self {
        WeChat {
            timeout: crate::sec::authn::wechat::DEFAULT_TIMEOUT,
        }
    }
}

pub struct Db {
    pub user: String,
    pub password: Option<String>,
    pub host: String,
    pub port: u16,
    pub dbname: String
}

impl Db {
    fn merge(&mut self, given: shape::Db) {
        if let Some(user) = given.user {
            self.user = user;
        }

        if given.password.is_some() {
            self.password = given.password;
        }

        if let Some(host) = given.host {
            self.host = host;
        }

        if let Some(port) = given.port {
            self.port = port;
        }

        if let Some(dbname) = given.dbname {
            self.dbname = dbname;
        }
    }
}

impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db")
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .finish()
    }
}

impl Default for Db {
    fn default() -> Self {
        Db {
            user: "postgres".into(),
            password: None,
            host: "localhost".into(),
            port: 5432,
            dbname: "gate".into(),
        }
    }
}

/// lexically resolve `.` and `..` without touching the filesystem
fn normalize<P>(path: P) -> PathBuf
where
    P: AsRef<Path>
{
    let mut rtn = PathBuf::new();

    for comp in path.as_ref().components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                rtn.pop();
            }
            other => rtn.push(other.as_os_str()),
        }
    }

    rtn
}

#[cfg(test)]
mod test {
    use super::*;

    fn merged(yaml: &str) -> error::Result<Settings> {
        let loaded: shape::Settings = serde_yaml::from_str(yaml)
            .expect("invalid test yaml");
        let path = PathBuf::from("/etc/gate/test.yaml");
        let mut settings = Settings::default();

        settings.merge(&Origin::root(&path), loaded)?;

        Ok(settings)
    }

    #[test]
    fn merge_overrides_defaults() {
        let settings = merged(r#"
id: 4
redis_enabled: true
listeners:
  main:
    addr: "127.0.0.1:9090"
wechat:
  timeout: 2
db:
  dbname: identity
sec:
  session:
    secure: false
"#).expect("failed to merge settings");

        assert_eq!(settings.id, 4);
        assert!(settings.redis_enabled);
        assert_eq!(settings.listeners["main"].addr, "127.0.0.1:9090".parse().unwrap());
        assert_eq!(settings.wechat.timeout, Duration::from_secs(2));
        assert_eq!(settings.db.dbname, "identity");
        assert_eq!(settings.db.user, "postgres");
        assert!(!settings.sec.session.secure);
    }

    #[test]
    fn listener_accepts_bare_ip() {
        let settings = merged(r#"
listeners:
  main:
    addr: "127.0.0.1"
"#).expect("failed to merge settings");

        assert_eq!(settings.listeners["main"].addr.port(), DEFAULT_PORT);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = merged("listeners:\n  main:\n    addr: \"not an addr\"\n")
            .expect_err("address should be rejected");

        assert!(err.to_string().contains("settings.listeners.\"main\".addr"));
        assert!(err.to_string().contains("/etc/gate/test.yaml"));

        assert!(merged("wechat:\n  timeout: 0\n").is_err());
    }

    #[test]
    fn debug_output_hides_db_password() {
        let settings = merged("db:\n  password: hunter2-secret\n")
            .expect("failed to merge settings");

        assert_eq!(settings.db.password.as_deref(), Some("hunter2-secret"));

        let printed = format!("{settings:#?}");

        assert!(!printed.contains("hunter2-secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn normalize_parent_dirs() {
        assert_eq!(normalize("/etc/gate/../gate.yaml"), PathBuf::from("/etc/gate.yaml"));
        assert_eq!(normalize("/etc/./gate.yaml"), PathBuf::from("/etc/gate.yaml"));
    }
}
