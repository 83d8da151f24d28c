use once_cell::sync::OnceCell;
use regex::Regex;
use std::collections::HashMap;

use camtrace_types::{ChannelSession, Severity, Transport, ValidationIssue};
use camtrace_types::TraceItem;

use crate::recognize::{channel_id_of, proactive_kind};
use camtrace_types::ProactiveCommand;

pub struct Reconstructed {
    pub sessions: Vec<ChannelSession>,
    pub issues: Vec<ValidationIssue>,
}

fn field_regex(label: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b{label}\b\s*[:#]?\s*([^\s,;]+)")).unwrap()
}

fn server_name_regex() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| field_regex("server name"))
}

fn ip_address_regex() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| field_regex("ip address"))
}

fn port_regex() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| field_regex("port"))
}

fn extract_endpoint(item: &TraceItem, session: &mut ChannelSession) {
    let Some(interp) = item.interpretation.as_ref() else { return };
    for content in interp.contents() {
        if session.server_name.is_none() {
            if let Some(c) = server_name_regex().captures(content) {
                session.server_name = Some(c[1].to_string());
            }
        }
        if let Some(c) = ip_address_regex().captures(content) {
            session.ip_addresses.insert(c[1].to_string());
        }
        if session.port.is_none() {
            if let Some(c) = port_regex().captures(content) {
                if let Ok(p) = c[1].parse::<u16>() {
                    session.port = Some(p);
                }
            }
        }
    }
}

fn infer_transport(port: Option<u16>) -> Transport {
    match port {
        Some(53) => Transport::Udp,
        Some(_) => Transport::Tcp,
        None => Transport::Unknown,
    }
}

/// Group OPEN/SEND/RECEIVE/CLOSE CHANNEL items into per-channel-id sessions,
/// running the `Closed -> Opened -> Closed` state machine and emitting the
/// associated validation issues for leaks, orphans and bad closes.
pub fn reconstruct(items: &[TraceItem]) -> Reconstructed {
    let mut open: HashMap<u8, ChannelSession> = HashMap::new();
    let mut sessions = Vec::new();
    let mut issues = Vec::new();

    for item in items {
        let Some(kind) = proactive_kind(item) else { continue };
        let Some(channel) = channel_id_of(item) else { continue };

        match kind {
            ProactiveCommand::OpenChannel => {
                if let Some(mut prior) = open.remove(&channel) {
                    prior.close_index = Some(item.index);
                    issues.push(ValidationIssue::new(
                        Severity::Critical,
                        "State Machine",
                        format!("channel {channel} re-opened before being closed"),
                        Some(item.index),
                        item.timestamp,
                    ));
                    prior.transport = infer_transport(prior.port);
                    prior.normalise_label();
                    sessions.push(prior);
                }
                let mut session = ChannelSession::new(channel, item.index);
                session.opened_at = item.timestamp;
                session.item_indices.push(item.index);
                extract_endpoint(item, &mut session);
                open.insert(channel, session);
            }
            ProactiveCommand::SendData | ProactiveCommand::ReceiveData => {
                if let Some(session) = open.get_mut(&channel) {
                    session.item_indices.push(item.index);
                    extract_endpoint(item, session);
                } else {
                    issues.push(ValidationIssue::new(
                        Severity::Warning,
                        "Channel",
                        format!("data on channel {channel} with no open session"),
                        Some(item.index),
                        item.timestamp,
                    ));
                }
            }
            ProactiveCommand::CloseChannel => {
                if let Some(mut session) = open.remove(&channel) {
                    session.close_index = Some(item.index);
                    session.closed_at = item.timestamp;
                    session.item_indices.push(item.index);
                    session.transport = infer_transport(session.port);
                    session.normalise_label();
                    sessions.push(session);
                } else {
                    issues.push(ValidationIssue::new(
                        Severity::Critical,
                        "State Machine",
                        format!("channel {channel} closed without being opened"),
                        Some(item.index),
                        item.timestamp,
                    ));
                }
            }
            _ => {}
        }
    }

    for (channel, mut session) in open {
        issues.push(ValidationIssue::new(
            Severity::Critical,
            "Resource Leak",
            format!("channel {channel} left open at end of trace"),
            session.close_index.or(Some(session.open_index)),
            session.opened_at,
        ));
        session.transport = infer_transport(session.port);
        session.normalise_label();
        sessions.push(session);
    }

    sessions.sort_by_key(|s| s.open_index);
    Reconstructed { sessions, issues }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camtrace_types::InterpretationNode;
    use chrono::NaiveDate;

    fn ts(sec: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, sec).unwrap()
    }

    fn item(index: usize, summary: &str, channel_text: &str) -> TraceItem {
        TraceItem {
            index,
            protocol: "BIP".into(),
            item_type: String::new(),
            timestamp: Some(ts(index as u32)),
            raw_hex: None,
            interpretation: Some(InterpretationNode::leaf(format!("{summary} {channel_text}"))),
            summary: summary.into(),
            apdu: None,
            tlvs: None,
        }
    }

    #[test]
    fn open_without_close_is_unclosed_leak() {
        let items = vec![
            item(0, "Open Channel", "Channel: 1"),
            item(1, "Send Data", "Channel: 1"),
        ];
        let r = reconstruct(&items);
        assert_eq!(r.sessions.len(), 1);
        assert_eq!(r.sessions[0].close_index, None);
        assert!(r.issues.iter().any(|i| i.category == "Resource Leak"));
    }

    #[test]
    fn close_without_open_is_critical() {
        let items = vec![item(0, "Close Channel", "Channel: 2")];
        let r = reconstruct(&items);
        assert!(r.sessions.is_empty());
        assert_eq!(r.issues.len(), 1);
        assert_eq!(r.issues[0].severity, Severity::Critical);
        assert_eq!(r.issues[0].category, "State Machine");
    }

    #[test]
    fn reopen_before_close_emits_leak_and_starts_new_session() {
        let items = vec![
            item(0, "Open Channel", "Channel: 1"),
            item(1, "Open Channel", "Channel: 1"),
            item(2, "Close Channel", "Channel: 1"),
        ];
        let r = reconstruct(&items);
        assert_eq!(r.sessions.len(), 2);
        assert!(r.issues.iter().any(|i| i.message.contains("re-opened")));
    }

    #[test]
    fn server_name_and_port_extracted_from_open_channel() {
        let items = vec![
            item(0, "Open Channel Server name: smdp.example.com Port: 443", "Channel: 1"),
            item(1, "Close Channel", "Channel: 1"),
        ];
        let r = reconstruct(&items);
        assert_eq!(r.sessions[0].server_name.as_deref(), Some("smdp.example.com"));
        assert_eq!(r.sessions[0].port, Some(443));
        assert_eq!(r.sessions[0].transport, Transport::Tcp);
    }
}
