use std::path::Path;

use camtrace_sdk::Trace;
use camtrace_types::{AnalysisConfig, TimelineRow};

use crate::error::CliError;

pub fn run(trace_path: &Path, config: AnalysisConfig) -> Result<Option<String>, CliError> {
    let trace = Trace::load(trace_path, None)?.with_config(config);
    let iccid = trace.flow().into_iter().find_map(|row| match row {
        TimelineRow::Event { kind, detail, .. } if kind == "ICCID" => detail,
        _ => None,
    });
    Ok(iccid)
}
