use camtrace_types::{ScenarioResult, Severity, TimelineRow, ValidationIssue};

use crate::handlers::stats::Stats;

fn timestamp_str(ts: Option<chrono::NaiveDateTime>) -> String {
    ts.map(|t| t.to_string()).unwrap_or_else(|| "?".to_string())
}

pub fn flow(rows: &[TimelineRow]) -> String {
    if rows.is_empty() {
        return "(no rows)".to_string();
    }

    let mut out = String::new();
    for row in rows {
        let ts = timestamp_str(row.timestamp());
        match row {
            TimelineRow::Session { channel_id, kind, open_index, close_index, .. } => {
                let close = close_index.map(|i| i.to_string()).unwrap_or_else(|| "open".to_string());
                out.push_str(&format!("{ts}  [chan {channel_id}] {kind}  items {open_index}..{close}\n"));
            }
            TimelineRow::Event { kind, item_index, detail, .. } => {
                let detail = detail.as_deref().map(|d| format!("  {d}")).unwrap_or_default();
                out.push_str(&format!("{ts}  {kind}  item {item_index}{detail}\n"));
            }
        }
    }
    out.trim_end().to_string()
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "INFO",
        Severity::Warning => "WARN",
        Severity::Critical => "CRIT",
    }
}

pub fn issues(issues: &[ValidationIssue]) -> String {
    if issues.is_empty() {
        return "(no issues)".to_string();
    }

    let mut out = String::new();
    for issue in issues {
        let ts = timestamp_str(issue.timestamp);
        out.push_str(&format!(
            "{ts}  {:<4}  {:<16}  {}\n",
            severity_label(issue.severity),
            issue.category,
            issue.message
        ));
    }
    out.trim_end().to_string()
}

pub fn iccid(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "(no ICCID found)".to_string())
}

pub fn stats(stats: &Stats) -> String {
    let mut out = format!(
        "items: {}\nsessions: {}\npairs: {}\n",
        stats.item_count, stats.session_count, stats.pair_count
    );
    if stats.issues_by_severity.is_empty() {
        out.push_str("issues: none\n");
    } else {
        out.push_str("issues:\n");
        for (severity, count) in &stats.issues_by_severity {
            out.push_str(&format!("  {severity}: {count}\n"));
        }
    }
    out.trim_end().to_string()
}

pub fn scenario_names(names: &[String]) -> String {
    if names.is_empty() {
        "(no scenarios defined)".to_string()
    } else {
        names.join("\n")
    }
}

pub fn scenario_result(result: &ScenarioResult) -> String {
    let mut out = String::new();
    for step in &result.steps {
        out.push_str(&format!("{:<5}  {}\n", format!("{:?}", step.status).to_uppercase(), step.label));
        if let Some(reason) = &step.reason {
            out.push_str(&format!("       {reason}\n"));
        }
    }
    out.push_str(&format!("overall: {}\n", format!("{:?}", result.overall).to_uppercase()));
    out.trim_end().to_string()
}
