//! XML Ingestor and APDU/TLV Decoder.
//!
//! Turns one concrete on-disk trace format into the canonical
//! [`camtrace_types`] model.

pub mod apdu_decode;
pub mod error;
pub mod hex;
pub mod timestamp;
pub mod tlv_decode;
pub mod xml;

pub use error::{Error, Result};
pub use xml::{ingest_bytes, ingest_path, ingest_reader, CancelCheck};

use camtrace_types::TraceModel;

/// Ingest a file path into a complete, immutable [`TraceModel`].
pub fn load(path: &std::path::Path, cancel: CancelCheck<'_>) -> Result<TraceModel> {
    let (items, parse_issues) = ingest_path(path, cancel)?;
    Ok(TraceModel { items, parse_issues })
}

/// Ingest in-memory XML bytes into a [`TraceModel`].
pub fn load_bytes(bytes: &[u8], cancel: CancelCheck<'_>) -> Result<TraceModel> {
    let (items, parse_issues) = ingest_bytes(bytes, cancel)?;
    Ok(TraceModel { items, parse_issues })
}
