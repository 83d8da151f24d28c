use std::collections::{HashMap, VecDeque};

use camtrace_types::{Pair, PairStatus, Pairing, ProactiveCommand, TraceItem};

use crate::recognize::{channel_id_of, is_fetch_like, proactive_kind};

/// Queue key: FETCH and TERMINAL RESPONSE are always looked up within the
/// same protocol; channel agreement (when both sides carry one) is enforced
/// separately by `take_match`.
fn match_key(item: &TraceItem) -> String {
    item.protocol.clone()
}

/// Pop the first entry from `queue` that is eligible to match a TERMINAL
/// RESPONSE carrying `response_channel`: an entry with no recorded channel
/// always matches (protocol-only fallback); an entry with a channel only
/// matches a response that carries the same channel.
fn take_match(queue: &mut VecDeque<(usize, Option<u8>)>, response_channel: Option<u8>) -> Option<usize> {
    let pos = queue.iter().position(|(_, channel)| match (channel, response_channel) {
        (Some(fetch_channel), Some(response_channel)) => *fetch_channel == response_channel,
        _ => true,
    })?;
    queue.remove(pos).map(|(index, _)| index)
}

fn status_from_response(item: &TraceItem) -> PairStatus {
    match &item.apdu {
        Some(apdu) if apdu.is_success() => PairStatus::Success,
        Some(_) => PairStatus::Error,
        None => PairStatus::Success,
    }
}

fn duration_ms(command: &TraceItem, response: &TraceItem) -> Option<i64> {
    let a = command.timestamp?;
    let b = response.timestamp?;
    Some((b - a).num_milliseconds())
}

/// Match every FETCH-like proactive command against the first subsequent
/// TERMINAL RESPONSE sharing its context, with no intervening unresponded
/// FETCH on that same context. A command left unmatched at end of trace is
/// `Pending` rather than dropped.
pub fn pair(items: &[TraceItem]) -> Pairing {
    let mut result = Pairing::default();
    let mut queues: HashMap<String, VecDeque<(usize, Option<u8>)>> = HashMap::new();

    for item in items {
        let Some(kind) = proactive_kind(item) else { continue };
        let channel = channel_id_of(item);
        let nav_key = Pairing::context_key(&item.protocol, channel);
        result.by_context.entry(nav_key).or_default().push(item.index);

        if matches!(kind, ProactiveCommand::TerminalResponse) {
            let key = match_key(item);
            if let Some(queue) = queues.get_mut(&key) {
                if let Some(fetch_index) = take_match(queue, channel) {
                    let fetch_item = &items[fetch_index];
                    let pair = Pair {
                        fetch_index,
                        response_index: Some(item.index),
                        duration_ms: duration_ms(fetch_item, item),
                        status: status_from_response(item),
                    };
                    result.by_fetch.insert(fetch_index, result.pairs.len());
                    result.by_response.insert(item.index, result.pairs.len());
                    result.pairs.push(pair);
                }
            }
        } else if is_fetch_like(kind) {
            let key = match_key(item);
            queues.entry(key).or_default().push_back((item.index, channel));
        }
    }

    for queue in queues.into_values() {
        for (fetch_index, _channel) in queue {
            result.by_fetch.insert(fetch_index, result.pairs.len());
            result.pairs.push(Pair {
                fetch_index,
                response_index: None,
                duration_ms: None,
                status: PairStatus::Pending,
            });
        }
    }

    result.pairs.sort_by_key(|p| p.fetch_index);
    result.by_fetch.clear();
    result.by_response.clear();
    for (i, p) in result.pairs.iter().enumerate() {
        result.by_fetch.insert(p.fetch_index, i);
        if let Some(r) = p.response_index {
            result.by_response.insert(r, i);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use camtrace_types::{Apdu, InterpretationNode};
    use chrono::NaiveDate;

    fn item(index: usize, protocol: &str, summary: &str, apdu: Option<Apdu>, ts_sec: u32) -> TraceItem {
        TraceItem {
            index,
            protocol: protocol.into(),
            item_type: String::new(),
            timestamp: Some(
                NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, ts_sec)
                    .unwrap(),
            ),
            raw_hex: None,
            interpretation: Some(InterpretationNode::leaf(summary)),
            summary: summary.into(),
            apdu,
            tlvs: None,
        }
    }

    fn response(index: usize, protocol: &str, sw1: u8, sw2: u8, ts_sec: u32) -> TraceItem {
        item(
            index,
            protocol,
            "Terminal Response",
            Some(Apdu::Response { data: vec![], sw1, sw2 }),
            ts_sec,
        )
    }

    #[test]
    fn pairs_fetch_with_following_terminal_response() {
        let items = vec![
            item(0, "ISO7816", "Fetch", None, 0),
            response(1, "ISO7816", 0x90, 0x00, 2),
        ];
        let pairing = pair(&items);
        assert_eq!(pairing.pairs.len(), 1);
        assert_eq!(pairing.pairs[0].response_index, Some(1));
        assert_eq!(pairing.pairs[0].status, PairStatus::Success);
        assert_eq!(pairing.pairs[0].duration_ms, Some(2000));
    }

    #[test]
    fn unmatched_fetch_is_pending() {
        let items = vec![item(0, "ISO7816", "Fetch", None, 0)];
        let pairing = pair(&items);
        assert_eq!(pairing.pairs[0].status, PairStatus::Pending);
        assert_eq!(pairing.pairs[0].response_index, None);
    }

    #[test]
    fn error_status_word_marks_pair_as_error() {
        let items = vec![
            item(0, "ISO7816", "Fetch", None, 0),
            response(1, "ISO7816", 0x6F, 0x00, 1),
        ];
        let pairing = pair(&items);
        assert_eq!(pairing.pairs[0].status, PairStatus::Error);
    }

    #[test]
    fn distinct_channels_pair_independently() {
        let items = vec![
            item(0, "BIP", "Open Channel on Channel: 1", None, 0),
            item(1, "BIP", "Send Data on Channel: 2", None, 1),
            response(2, "BIP", 0x90, 0x00, 2),
            response(3, "BIP", 0x90, 0x00, 3),
        ];
        let pairing = pair(&items);
        assert_eq!(pairing.pairs.len(), 2);
        assert_eq!(pairing.by_fetch[&0], pairing.by_response[&2]);
        assert_eq!(pairing.by_fetch[&1], pairing.by_response[&3]);
    }
}
