use std::collections::HashMap;

use camtrace_types::{find_tag, ChannelSession, Direction, PayloadStream, TraceItem};

use crate::recognize::proactive_kind;
use camtrace_types::ProactiveCommand;

/// Tag carrying the channel data payload within a SEND/RECEIVE DATA command,
/// as used by the trace producers this crate was built against. Configurable
/// in principle; fixed here since no alternate producer has been observed.
const CHANNEL_DATA_TAG: u32 = 0x36;

fn direction_of(kind: ProactiveCommand) -> Option<Direction> {
    match kind {
        ProactiveCommand::SendData => Some(Direction::MeToSim),
        ProactiveCommand::ReceiveData => Some(Direction::SimToMe),
        _ => None,
    }
}

/// Concatenate, per direction, the data TLV payloads found within a session's
/// SEND/RECEIVE DATA items, in trace order.
pub fn reassemble(session: &ChannelSession, items: &[TraceItem]) -> HashMap<Direction, PayloadStream> {
    let mut streams: HashMap<Direction, PayloadStream> = HashMap::new();

    for &idx in &session.item_indices {
        let item = &items[idx];
        let Some(kind) = proactive_kind(item) else { continue };
        let Some(direction) = direction_of(kind) else { continue };
        let Some(tlvs) = item.tlvs.as_ref() else { continue };
        let Some(data) = find_tag(tlvs, CHANNEL_DATA_TAG) else { continue };
        if data.value.is_empty() {
            continue;
        }
        streams.entry(direction).or_default().append(item.index, &data.value);
    }

    streams
}

#[cfg(test)]
mod tests {
    use super::*;
    use camtrace_types::Tlv;

    fn data_item(index: usize, summary: &str, payload: Vec<u8>) -> TraceItem {
        let tlv = Tlv {
            tag: vec![0x36],
            length: payload.len(),
            tag_offset: 0,
            length_offset: 1,
            value_offset: 2,
            value: payload,
            children: Vec::new(),
        };
        TraceItem {
            index,
            protocol: "BIP".into(),
            item_type: String::new(),
            timestamp: None,
            raw_hex: None,
            interpretation: Some(camtrace_types::InterpretationNode::leaf(summary)),
            summary: summary.into(),
            apdu: None,
            tlvs: Some(vec![tlv]),
        }
    }

    #[test]
    fn concatenates_send_data_in_order() {
        let items = vec![
            data_item(0, "Send Data", vec![0x01, 0x02]),
            data_item(1, "Send Data", vec![0x03]),
        ];
        let mut session = ChannelSession::new(1, 0);
        session.item_indices = vec![0, 1];
        let streams = reassemble(&session, &items);
        let stream = &streams[&Direction::MeToSim];
        assert_eq!(stream.bytes, vec![0x01, 0x02, 0x03]);
        assert_eq!(stream.item_for_offset(2), Some(1));
    }

    #[test]
    fn empty_payload_is_skipped() {
        let items = vec![data_item(0, "Send Data", vec![])];
        let mut session = ChannelSession::new(1, 0);
        session.item_indices = vec![0];
        let streams = reassemble(&session, &items);
        assert!(streams.get(&Direction::MeToSim).is_none());
    }
}
