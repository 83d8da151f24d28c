use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Error type for SDK operations.
#[derive(Debug)]
pub enum Error {
    Ingest(camtrace_ingest::Error),
    Engine(camtrace_engine::Error),
    Runtime(camtrace_runtime::Error),
    /// The scenario config file is not valid JSON, or names a scenario with
    /// no steps.
    InvalidScenarioFile(String),
    /// `selected_scenario` or a requested name has no matching entry.
    UnknownScenario(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Ingest(err) => write!(f, "{err}"),
            Error::Engine(err) => write!(f, "{err}"),
            Error::Runtime(err) => write!(f, "{err}"),
            Error::InvalidScenarioFile(msg) => write!(f, "invalid scenario file: {msg}"),
            Error::UnknownScenario(name) => write!(f, "no scenario named {name:?}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Ingest(err) => Some(err),
            Error::Engine(err) => Some(err),
            Error::Runtime(err) => Some(err),
            Error::InvalidScenarioFile(_) | Error::UnknownScenario(_) => None,
        }
    }
}

impl From<camtrace_ingest::Error> for Error {
    fn from(err: camtrace_ingest::Error) -> Self {
        Error::Ingest(err)
    }
}

impl From<camtrace_engine::Error> for Error {
    fn from(err: camtrace_engine::Error) -> Self {
        Error::Engine(err)
    }
}

impl From<camtrace_runtime::Error> for Error {
    fn from(err: camtrace_runtime::Error) -> Self {
        Error::Runtime(err)
    }
}
