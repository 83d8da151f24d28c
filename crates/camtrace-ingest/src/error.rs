use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Ingestion error taxonomy. Only `InvalidXml` is fatal: every other
/// decode failure is localised and recorded as a `MalformedItem` warning or a
/// `None` decoder field on the affected item.
#[derive(Debug)]
pub enum Error {
    /// The document is not well-formed, or the `<tracedata>` root is missing.
    InvalidXml(String),
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidXml(msg) => write!(f, "invalid trace XML: {msg}"),
            Error::Io(err) => write!(f, "IO error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::InvalidXml(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::InvalidXml(err.to_string())
    }
}
