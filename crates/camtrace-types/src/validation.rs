use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Severity of a validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub category: String,
    pub message: String,
    pub item_index: Option<usize>,
    pub timestamp: Option<NaiveDateTime>,
}

impl ValidationIssue {
    pub fn new(
        severity: Severity,
        category: impl Into<String>,
        message: impl Into<String>,
        item_index: Option<usize>,
        timestamp: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            severity,
            category: category.into(),
            message: message.into(),
            item_index,
            timestamp,
        }
    }
}

/// Sort issues chronologically ascending; items without a timestamp keep trace
/// order (by item_index) after all dated items
pub fn sort_issues(issues: &mut [ValidationIssue]) {
    issues.sort_by(|a, b| match (a.timestamp, b.timestamp) {
        (Some(ta), Some(tb)) => ta.cmp(&tb).then(a.item_index.cmp(&b.item_index)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.item_index.cmp(&b.item_index),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(ts: Option<NaiveDateTime>, idx: usize) -> ValidationIssue {
        ValidationIssue::new(Severity::Info, "cat", "msg", Some(idx), ts)
    }

    #[test]
    fn dated_issues_sort_before_undated_and_stay_chronological() {
        let t1 = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 1)
            .unwrap();
        let t2 = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 2)
            .unwrap();
        let mut issues = vec![issue(None, 5), issue(Some(t2), 2), issue(Some(t1), 1)];
        sort_issues(&mut issues);
        let order: Vec<usize> = issues.iter().map(|i| i.item_index.unwrap()).collect();
        assert_eq!(order, vec![1, 2, 5]);
    }
}
