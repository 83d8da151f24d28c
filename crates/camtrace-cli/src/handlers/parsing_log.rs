use std::path::Path;

use camtrace_sdk::Trace;
use camtrace_types::{AnalysisConfig, Severity, ValidationIssue};
use chrono::{NaiveDate, NaiveDateTime};

use crate::args::SeverityArg;
use crate::error::CliError;

fn parse_timestamp(s: &str) -> Result<NaiveDateTime, CliError> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt);
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_hms_opt(0, 0, 0).expect("midnight is always valid"));
    }
    Err(CliError::InvalidInput(format!(
        "not a recognised timestamp (expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS): {s:?}"
    )))
}

fn severity_matches(arg: SeverityArg, severity: Severity) -> bool {
    matches!(
        (arg, severity),
        (SeverityArg::Info, Severity::Info)
            | (SeverityArg::Warning, Severity::Warning)
            | (SeverityArg::Critical, Severity::Critical)
    )
}

#[allow(clippy::too_many_arguments)]
pub fn run(
    trace_path: &Path,
    config: AnalysisConfig,
    all: bool,
    severities: &[SeverityArg],
    categories: &[String],
    since: Option<&str>,
    until: Option<&str>,
) -> Result<Vec<ValidationIssue>, CliError> {
    let trace = Trace::load(trace_path, None)?.with_config(config);
    let mut issues = trace.validate();

    if all {
        return Ok(issues);
    }

    let since = since.map(parse_timestamp).transpose()?;
    let until = until.map(parse_timestamp).transpose()?;

    issues.retain(|issue| {
        let severity_ok = severities.is_empty() || severities.iter().any(|s| severity_matches(*s, issue.severity));
        let category_ok = categories.is_empty() || categories.iter().any(|c| c.eq_ignore_ascii_case(&issue.category));
        let since_ok = since.map_or(true, |s| issue.timestamp.map_or(true, |t| t >= s));
        let until_ok = until.map_or(true, |u| issue.timestamp.map_or(true, |t| t <= u));
        severity_ok && category_ok && since_ok && until_ok
    });

    Ok(issues)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_only_timestamp_parses_to_midnight() {
        let ts = parse_timestamp("2024-01-01").unwrap();
        assert_eq!(ts.to_string(), "2024-01-01 00:00:00");
    }

    #[test]
    fn malformed_timestamp_is_invalid_input() {
        assert!(parse_timestamp("not-a-date").is_err());
    }
}
