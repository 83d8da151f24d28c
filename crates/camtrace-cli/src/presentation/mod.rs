//! Output rendering, split by format the way the analysis stages are split
//! by concern: a `text` module for the human-readable rendering and a `json`
//! module that hands back a `serde_json::Value` ready to serialize.

pub mod json;
pub mod text;

use std::fs;
use std::path::Path;

use crate::args::OutputFormat;
use crate::error::CliError;

/// Render `text` or `json` depending on `format`, then write it to `out` or
/// stdout.
pub fn emit(
    format: OutputFormat,
    text: String,
    json: serde_json::Value,
    out: Option<&Path>,
) -> Result<(), CliError> {
    let rendered = match format {
        OutputFormat::Text => text,
        OutputFormat::Json => serde_json::to_string_pretty(&json).expect("value always serializes"),
    };

    match out {
        Some(path) => {
            fs::write(path, format!("{rendered}\n"))?;
        }
        None => println!("{rendered}"),
    }

    Ok(())
}
