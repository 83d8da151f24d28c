use std::fmt;

/// Result type for camtrace-types operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building or indexing the trace model.
#[derive(Debug)]
pub enum Error {
    /// A trace item index was requested that does not exist.
    IndexOutOfRange(usize),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::IndexOutOfRange(i) => write!(f, "no trace item at index {i}"),
        }
    }
}

impl std::error::Error for Error {}
