use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy for the background/parallel execution layer. Ingestion
/// failures are wrapped rather than flattened, so a caller can still match on
/// `camtrace_ingest::Error::InvalidXml` if it needs to.
#[derive(Debug)]
pub enum Error {
    Ingest(camtrace_ingest::Error),
    /// The worker thread panicked before it could send a result.
    WorkerPanicked,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Ingest(err) => write!(f, "ingestion error: {err}"),
            Error::WorkerPanicked => write!(f, "background ingestion worker panicked"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Ingest(err) => Some(err),
            Error::WorkerPanicked => None,
        }
    }
}

impl From<camtrace_ingest::Error> for Error {
    fn from(err: camtrace_ingest::Error) -> Self {
        Error::Ingest(err)
    }
}
