use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Engine-level errors. Decode-level failures (TLS/DNS/X.509) are localised
/// to the buffer they affect and never surface here; this enum only covers
/// failures that prevent an entire analysis stage from running.
#[derive(Debug)]
pub enum Error {
    /// A scenario configuration referenced no steps.
    EmptyScenario,
    /// Ingestion was cancelled mid-flight.
    Cancelled,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyScenario => write!(f, "scenario has no steps"),
            Error::Cancelled => write!(f, "analysis was cancelled"),
        }
    }
}

impl std::error::Error for Error {}
