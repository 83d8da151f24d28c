use camtrace_types::{Apdu, ProactiveCommand, Severity, TraceItem, ValidationIssue};

use crate::flow::find_iccid_event;
use crate::recognize::proactive_kind;

fn find_seq(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn contains_seq(haystack: &[u8], needle: &[u8]) -> bool {
    find_seq(haystack, needle).is_some()
}

const LOC_STATUS_NORMAL: [u8; 3] = [0x1B, 0x01, 0x00];
const LOC_STATUS_LIMITED: [u8; 3] = [0x1B, 0x01, 0x01];
const LOC_STATUS_NO_SERVICE: [u8; 3] = [0x1B, 0x01, 0x02];
const BIP_ERROR_PREFIX: [u8; 3] = [0x03, 0x02, 0x3A];

fn scan_raw_hex(item: &TraceItem, issues: &mut Vec<ValidationIssue>) {
    let Some(raw) = &item.raw_hex else { return };

    if contains_seq(raw, &LOC_STATUS_NORMAL) {
        issues.push(ValidationIssue::new(
            Severity::Info,
            "Location Status / Normal",
            "Normal",
            Some(item.index),
            item.timestamp,
        ));
    } else if contains_seq(raw, &LOC_STATUS_LIMITED) {
        issues.push(ValidationIssue::new(
            Severity::Warning,
            "Location Status / Limited",
            "Limited",
            Some(item.index),
            item.timestamp,
        ));
    } else if contains_seq(raw, &LOC_STATUS_NO_SERVICE) {
        // downgraded from Critical to Warning, kept conservative
        // rather than configurable pending a decision from the operator.
        issues.push(ValidationIssue::new(
            Severity::Warning,
            "Location Status / No Service",
            "No Service",
            Some(item.index),
            item.timestamp,
        ));
    }

    if let Some(pos) = find_seq(raw, &BIP_ERROR_PREFIX) {
        let cause = raw.get(pos + 3).copied();
        let message = match cause {
            Some(c) => format!("BIP error, cause byte 0x{c:02X}"),
            None => "BIP error".to_string(),
        };
        issues.push(ValidationIssue::new(
            Severity::Critical,
            "BIP Error",
            message,
            Some(item.index),
            item.timestamp,
        ));
    }
}

fn scan_status_word(item: &TraceItem, issues: &mut Vec<ValidationIssue>) {
    if let Some(Apdu::Response { sw1, sw2, .. }) = &item.apdu {
        if (*sw1, *sw2) == (0x50, 0x23) {
            issues.push(ValidationIssue::new(
                Severity::Critical,
                "Status Word",
                "SW 50 23",
                Some(item.index),
                item.timestamp,
            ));
        }
    }
}

fn scan_summary_text(item: &TraceItem, issues: &mut Vec<ValidationIssue>) {
    let summary = item.summary.to_ascii_lowercase();

    if summary.contains("card powered off") || summary.contains("msc 1900") {
        issues.push(ValidationIssue::new(
            Severity::Info,
            "Card Event",
            "Card Powered Off",
            Some(item.index),
            item.timestamp,
        ));
    }
    if summary.contains("cold reset") || summary.contains("power on") || summary.contains("refresh") {
        issues.push(ValidationIssue::new(
            Severity::Info,
            "Card Event",
            item.summary.clone(),
            Some(item.index),
            item.timestamp,
        ));
    }
    if summary.contains("link dropped") || summary.contains("link off") {
        issues.push(ValidationIssue::new(
            Severity::Critical,
            "Channel Status",
            item.summary.clone(),
            Some(item.index),
            item.timestamp,
        ));
    }
    if summary.contains("terminal response") && summary.contains("unexpected") {
        issues.push(ValidationIssue::new(
            Severity::Info,
            "Trace",
            "unexpected Terminal Response",
            Some(item.index),
            item.timestamp,
        ));
    }
    if matches!(proactive_kind(item), Some(ProactiveCommand::OpenChannel))
        && !item.interpretation_contains("ip address")
    {
        issues.push(ValidationIssue::new(
            Severity::Info,
            "Channel",
            "Open Channel without an IP address (DNS likely)",
            Some(item.index),
            item.timestamp,
        ));
    }
}

/// Single pass across the trace model producing every item-scoped issue;
/// state-machine and TLS-compliance issues are produced by their own stages
/// and merged in by the caller before sorting.
pub fn scan(items: &[TraceItem]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for item in items {
        scan_raw_hex(item, &mut issues);
        scan_status_word(item, &mut issues);
        scan_summary_text(item, &mut issues);
    }

    if let Some((item_index, timestamp, iccid)) = find_iccid_event(items) {
        issues.push(ValidationIssue::new(
            Severity::Info,
            "ICCID Detected",
            format!("ICCID {iccid}"),
            Some(item_index),
            timestamp,
        ));
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use camtrace_types::InterpretationNode;

    fn raw_item(index: usize, raw: Vec<u8>) -> TraceItem {
        TraceItem {
            index,
            protocol: "ISO7816".into(),
            item_type: "envelope".into(),
            timestamp: None,
            raw_hex: Some(raw),
            interpretation: None,
            summary: String::new(),
            apdu: None,
            tlvs: None,
        }
    }

    #[test]
    fn location_status_limited_is_warning() {
        let item = raw_item(0, vec![0x00, 0x1B, 0x01, 0x01]);
        let issues = scan(std::slice::from_ref(&item));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].category, "Location Status / Limited");
        assert_eq!(issues[0].severity, Severity::Warning);
    }

    #[test]
    fn bip_error_extracts_cause_byte() {
        let item = raw_item(0, vec![0x03, 0x02, 0x3A, 0x05]);
        let issues = scan(std::slice::from_ref(&item));
        assert!(issues.iter().any(|i| i.category == "BIP Error" && i.message.contains("0x05")));
    }

    #[test]
    fn sw_50_23_is_critical() {
        let mut item = raw_item(0, vec![]);
        item.apdu = Some(Apdu::Response { sw1: 0x50, sw2: 0x23, data: vec![] });
        let issues = scan(std::slice::from_ref(&item));
        assert_eq!(issues[0].severity, Severity::Critical);
        assert_eq!(issues[0].category, "Status Word");
    }

    #[test]
    fn open_channel_without_ip_is_info() {
        let mut item = raw_item(0, vec![]);
        item.summary = "Open Channel".into();
        item.interpretation = Some(InterpretationNode::leaf("Open Channel Channel: 1"));
        let issues = scan(std::slice::from_ref(&item));
        assert!(issues.iter().any(|i| i.category == "Channel"));
    }
}
