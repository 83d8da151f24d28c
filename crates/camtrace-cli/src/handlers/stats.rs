use std::collections::BTreeMap;
use std::path::Path;

use camtrace_sdk::Trace;
use camtrace_types::{AnalysisConfig, Severity};
use serde::Serialize;

use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct Stats {
    pub item_count: usize,
    pub session_count: usize,
    pub pair_count: usize,
    pub issues_by_severity: BTreeMap<String, usize>,
}

fn severity_key(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "info",
        Severity::Warning => "warning",
        Severity::Critical => "critical",
    }
}

pub fn run(trace_path: &Path, config: AnalysisConfig) -> Result<Stats, CliError> {
    let trace = Trace::load(trace_path, None)?.with_config(config);
    let (sessions, _reconstruction_issues) = trace.sessions();
    let issues = trace.validate();
    let pairing = trace.pairs();

    let mut issues_by_severity = BTreeMap::new();
    for issue in &issues {
        *issues_by_severity.entry(severity_key(issue.severity).to_string()).or_insert(0usize) += 1;
    }

    Ok(Stats {
        item_count: trace.model().len(),
        session_count: sessions.len(),
        pair_count: pairing.pairs.len(),
        issues_by_severity,
    })
}
