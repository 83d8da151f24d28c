use camtrace_types::{Apdu, ChannelSession, ProactiveCommand, Role, TimelineRow, TraceItem};

use crate::recognize::proactive_kind;

const EF_ICCID_FID: [u8; 2] = [0x2F, 0xE2];

fn session_kind(session: &ChannelSession) -> String {
    if session.role != Role::Unknown {
        session.role.label().to_string()
    } else {
        session.label.clone()
    }
}

fn is_cold_reset(item: &TraceItem) -> bool {
    let summary = item.summary.to_ascii_lowercase();
    summary.contains("cold reset") || summary.contains("power on")
}

/// An OPEN CHANNEL that carries no IP address asks the ME to resolve the
/// server name itself rather than open a socket to a given address; this is
/// the "DNS by ME" lookup the flow timeline reports as its own event,
/// distinct from a reconstructed DNS channel session.
fn is_dns_by_me(item: &TraceItem) -> bool {
    matches!(proactive_kind(item), Some(ProactiveCommand::OpenChannel))
        && !item.interpretation_contains("ip address")
}

/// Decode a BCD-encoded ICCID: low nibble is the first digit, high nibble the
/// second; a high nibble of `0xF` is the pad terminator for an odd-length ICCID.
fn decode_iccid(data: &[u8]) -> Option<String> {
    let mut digits = String::new();
    for &byte in data {
        let lo = byte & 0x0F;
        let hi = (byte >> 4) & 0x0F;
        if lo > 9 {
            break;
        }
        digits.push((b'0' + lo) as char);
        if hi == 0x0F {
            break;
        }
        if hi > 9 {
            break;
        }
        digits.push((b'0' + hi) as char);
    }
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}

fn is_select_iccid(item: &TraceItem) -> bool {
    matches!(proactive_kind(item), Some(ProactiveCommand::Select))
        && matches!(
            &item.apdu,
            Some(Apdu::Command { data, .. }) if data.ends_with(&EF_ICCID_FID)
        )
}

/// Find the first ICCID decodable from a SELECT EF_ICCID followed by the
/// nearest subsequent READ BINARY response.
pub(crate) fn find_iccid_event(items: &[TraceItem]) -> Option<(usize, Option<chrono::NaiveDateTime>, String)> {
    for (i, item) in items.iter().enumerate() {
        if !is_select_iccid(item) {
            continue;
        }
        for candidate in items.iter().skip(i + 1) {
            if !matches!(proactive_kind(candidate), Some(ProactiveCommand::ReadBinary)) {
                continue;
            }
            if let Some(Apdu::Response { data, .. }) = &candidate.apdu {
                if let Some(iccid) = decode_iccid(data) {
                    return Some((candidate.index, candidate.timestamp, iccid));
                }
            }
            break;
        }
    }
    None
}

/// Merge reconstructed sessions and key events (Refresh, Cold Reset, ICCID)
/// into one chronological timeline, sorted by timestamp with stable
/// tie-break on the anchor item index.
pub fn build_flow(items: &[TraceItem], sessions: &[ChannelSession]) -> Vec<TimelineRow> {
    let mut rows: Vec<TimelineRow> = sessions
        .iter()
        .map(|s| TimelineRow::Session {
            channel_id: s.channel_id,
            kind: session_kind(s),
            open_index: s.open_index,
            close_index: s.close_index,
            timestamp: s.opened_at.or_else(|| items.get(s.open_index).and_then(|i| i.timestamp)),
        })
        .collect();

    for item in items {
        match proactive_kind(item) {
            Some(ProactiveCommand::Refresh) => rows.push(TimelineRow::Event {
                kind: "Refresh".to_string(),
                item_index: item.index,
                timestamp: item.timestamp,
                detail: None,
            }),
            _ if is_cold_reset(item) => rows.push(TimelineRow::Event {
                kind: "Cold Reset".to_string(),
                item_index: item.index,
                timestamp: item.timestamp,
                detail: None,
            }),
            _ if is_dns_by_me(item) => rows.push(TimelineRow::Event {
                kind: "DNSbyME".to_string(),
                item_index: item.index,
                timestamp: item.timestamp,
                detail: None,
            }),
            _ => {}
        }
    }

    if let Some((item_index, timestamp, iccid)) = find_iccid_event(items) {
        rows.push(TimelineRow::Event {
            kind: "ICCID".to_string(),
            item_index,
            timestamp,
            detail: Some(iccid),
        });
    }

    rows.sort_by(|a, b| match (a.timestamp(), b.timestamp()) {
        (Some(ta), Some(tb)) => ta.cmp(&tb).then(a.anchor_index().cmp(&b.anchor_index())),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.anchor_index().cmp(&b.anchor_index()),
    });

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use camtrace_types::Transport;
    use chrono::NaiveDate;

    fn ts(sec: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, sec).unwrap()
    }

    fn select_iccid(index: usize) -> TraceItem {
        TraceItem {
            index,
            protocol: "ISO7816".into(),
            item_type: String::new(),
            timestamp: Some(ts(index as u32)),
            raw_hex: None,
            interpretation: Some(camtrace_types::InterpretationNode::leaf("Select")),
            summary: "Select".into(),
            apdu: Some(Apdu::Command {
                cla: 0x00,
                ins: 0xA4,
                p1: 0x00,
                p2: 0x00,
                lc: Some(2),
                data: vec![0x2F, 0xE2],
                le: None,
            }),
            tlvs: None,
        }
    }

    fn read_binary_response(index: usize, iccid_bytes: Vec<u8>) -> TraceItem {
        TraceItem {
            index,
            protocol: "ISO7816".into(),
            item_type: String::new(),
            timestamp: Some(ts(index as u32)),
            raw_hex: None,
            interpretation: Some(camtrace_types::InterpretationNode::leaf("Read Binary")),
            summary: "Read Binary".into(),
            apdu: Some(Apdu::Response { sw1: 0x90, sw2: 0x00, data: iccid_bytes }),
            tlvs: None,
        }
    }

    #[test]
    fn iccid_decoded_from_select_then_read_binary() {
        // ICCID "8988211000000526515" padded with trailing F nibble.
        let items = vec![
            select_iccid(0),
            read_binary_response(1, vec![0x89, 0x88, 0x21, 0x01, 0x00, 0x00, 0x00, 0x25, 0x56, 0x15]),
        ];
        let rows = build_flow(&items, &[]);
        let iccid_row = rows.iter().find(|r| r.kind() == "ICCID").unwrap();
        match iccid_row {
            TimelineRow::Event { detail, .. } => assert!(detail.is_some()),
            _ => panic!("expected event row"),
        }
    }

    #[test]
    fn sessions_and_events_sorted_chronologically() {
        let mut session = ChannelSession::new(1, 0);
        session.opened_at = Some(ts(5));
        session.transport = Transport::Tcp;
        let items = vec![];
        let rows = build_flow(&items, &[session]);
        assert_eq!(rows.len(), 1);
    }

    fn open_channel(index: usize, summary: &str) -> TraceItem {
        TraceItem {
            index,
            protocol: "BIP".into(),
            item_type: "envelope".into(),
            timestamp: Some(ts(index as u32)),
            raw_hex: None,
            interpretation: Some(camtrace_types::InterpretationNode::leaf(summary)),
            summary: summary.into(),
            apdu: None,
            tlvs: None,
        }
    }

    #[test]
    fn open_channel_without_ip_is_reported_as_dns_by_me_event() {
        let items = vec![open_channel(0, "Open Channel Channel: 1")];
        let rows = build_flow(&items, &[]);
        assert!(rows.iter().any(|r| r.kind() == "DNSbyME"));
    }

    #[test]
    fn open_channel_with_ip_is_not_dns_by_me() {
        let items = vec![open_channel(0, "Open Channel IP address: 8.8.8.8 Channel: 1")];
        let rows = build_flow(&items, &[]);
        assert!(!rows.iter().any(|r| r.kind() == "DNSbyME"));
    }
}
