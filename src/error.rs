use gate_lib::context_trait;

type BoxDynError = Box<dyn std::error::Error + Send + Sync>;

/// errors that stop the process from starting. these never reach a client
#[derive(Debug)]
pub struct Error {
    msg: String,
    src: Option<BoxDynError>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn new<M>(msg: M) -> Self
    where
        M: Into<String>
    {
        Error {
            msg: msg.into(),
            src: None,
        }
    }

    pub fn with_source<S>(mut self, src: S) -> Self
    where
        S: Into<BoxDynError>
    {
        self.src = Some(src.into());
        self
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.msg)?;

        if let Some(src) = &self.src {
            write!(f, ". {src}")?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.src.as_ref().map(|v| & **v as _)
    }
}

macro_rules! startup_error {
    ($e:path, $m:expr) => {
        impl From<$e> for Error {
            fn from(err: $e) -> Self {
                Error::new($m).with_source(err)
            }
        }
    };
}

startup_error!(deadpool_postgres::CreatePoolError, "failed to create database pool");
startup_error!(crate::options::OptionError, "failed to load options");
startup_error!(reqwest::Error, "failed to create http client");

context_trait!(Error);

impl<T, E> Context<T, E> for std::result::Result<T, E>
where
    E: Into<BoxDynError>
{
    fn context<C>(self, cxt: C) -> std::result::Result<T, Error>
    where
        C: Into<String>
    {
        self.map_err(|err| Error::new(cxt).with_source(err))
    }
}

impl<T> Context<T, ()> for std::option::Option<T> {
    fn context<C>(self, cxt: C) -> std::result::Result<T, Error>
    where
        C: Into<String>
    {
        self.ok_or_else(|| Error::new(cxt))
    }
}
