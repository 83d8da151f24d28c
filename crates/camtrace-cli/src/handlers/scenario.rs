use std::path::Path;

use camtrace_sdk::{ScenarioFile, Trace};
use camtrace_types::{AnalysisConfig, ScenarioResult};

use crate::error::CliError;

pub fn list(scenarios_path: &Path) -> Result<Vec<String>, CliError> {
    let file = ScenarioFile::load(scenarios_path)?;
    let mut names: Vec<String> = file.names().map(str::to_string).collect();
    names.sort();
    Ok(names)
}

pub fn run(
    scenarios_path: &Path,
    name: &str,
    trace_path: &Path,
    config: AnalysisConfig,
) -> Result<ScenarioResult, CliError> {
    let file = ScenarioFile::load(scenarios_path)?;
    let scenario = file.get(name)?;
    let trace = Trace::load(trace_path, None)?.with_config(config);
    let result = trace.run_scenario(scenario)?;
    Ok(result)
}
