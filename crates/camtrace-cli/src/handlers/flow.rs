use std::path::Path;

use camtrace_sdk::Trace;
use camtrace_types::{AnalysisConfig, FlowFilter, TimelineRow};

use crate::error::CliError;

pub fn run(trace_path: &Path, config: AnalysisConfig, filter: FlowFilter) -> Result<Vec<TimelineRow>, CliError> {
    let trace = Trace::load(trace_path, None)?.with_config(config);
    let rows = trace.flow().into_iter().filter(|row| filter.matches(row)).collect();
    Ok(rows)
}
