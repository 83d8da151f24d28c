use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-level error, layered over the SDK's own error taxonomy. Built with
/// `thiserror` rather than the hand-rolled enums the crates below it use,
/// since this is the outermost, user-facing boundary.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    Sdk(#[from] camtrace_sdk::Error),
    #[error("invalid config file: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// `0` is reserved for success and is never returned here; scenario runs
    /// that succeed but evaluate to a `Fail` are not errors and are mapped to
    /// exit code 4 at the command layer instead.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Sdk(camtrace_sdk::Error::Ingest(camtrace_ingest::Error::InvalidXml(_))) => 3,
            _ => 2,
        }
    }
}
