use camtrace_types::{ScenarioResult, TimelineRow, ValidationIssue};
use serde_json::{json, Value};

use crate::handlers::stats::Stats;

pub fn flow(rows: &[TimelineRow]) -> Value {
    json!({ "rows": rows })
}

pub fn issues(issues: &[ValidationIssue]) -> Value {
    json!({ "issues": issues })
}

pub fn iccid(value: &Option<String>) -> Value {
    json!({ "iccid": value })
}

pub fn stats(stats: &Stats) -> Value {
    serde_json::to_value(stats).expect("Stats always serializes")
}

pub fn scenario_names(names: &[String]) -> Value {
    json!({ "scenarios": names })
}

pub fn scenario_result(result: &ScenarioResult) -> Value {
    serde_json::to_value(result).expect("ScenarioResult always serializes")
}
