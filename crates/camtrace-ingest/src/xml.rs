use std::io::BufRead;

use camtrace_types::{InterpretationNode, Severity, TraceItem, ValidationIssue};
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, info, warn};

use crate::apdu_decode::{self, classify_item_type};
use crate::error::{Error, Result};
use crate::hex::decode_rawhex;
use crate::tlv_decode::parse_tlvs;
use crate::timestamp::TimestampParts;

/// Checked between items so long ingests can be aborted cooperatively.
/// Returns `true` when the caller wants to stop.
pub type CancelCheck<'a> = Option<&'a dyn Fn() -> bool>;

fn attr_str(e: &quick_xml::events::BytesStart, name: &str) -> Option<String> {
    e.attributes().flatten().find_map(|a| {
        if a.key.as_ref() == name.as_bytes() {
            a.unescape_value().ok().map(|v| v.into_owned())
        } else {
            None
        }
    })
}

fn attr_num<T: std::str::FromStr>(e: &quick_xml::events::BytesStart, name: &str) -> Option<T> {
    attr_str(e, name).and_then(|v| v.parse().ok())
}

struct PendingItem {
    protocol: String,
    item_type: String,
    ts: TimestampParts,
    raw_hex: Option<Vec<u8>>,
    interpretation: Option<InterpretationNode>,
}

fn start_item(e: &quick_xml::events::BytesStart) -> PendingItem {
    PendingItem {
        protocol: attr_str(e, "protocol").unwrap_or_default(),
        item_type: attr_str(e, "type").unwrap_or_default(),
        ts: TimestampParts {
            year: attr_num(e, "year"),
            month: attr_num(e, "month"),
            date: attr_num(e, "date"),
            hour: attr_num(e, "hour"),
            minute: attr_num(e, "minute"),
            second: attr_num(e, "second"),
            millisecond: attr_num(e, "millisecond"),
            nanosecond: attr_num(e, "nanosecond"),
        },
        raw_hex: None,
        interpretation: None,
    }
}

fn apply_data(
    e: &quick_xml::events::BytesStart,
    pending: Option<&mut PendingItem>,
    index: usize,
    parse_issues: &mut Vec<ValidationIssue>,
) {
    let Some(p) = pending else { return };
    let Some(raw) = attr_str(e, "rawhex") else { return };
    match decode_rawhex(&raw) {
        Some(bytes) => p.raw_hex = Some(bytes),
        None => {
            warn!(index, "malformed rawhex attribute");
            parse_issues.push(ValidationIssue::new(
                Severity::Warning,
                "MalformedItem",
                format!("item {index}: malformed rawhex attribute"),
                Some(index),
                p.ts.compose(),
            ));
        }
    }
}

fn start_interp(e: &quick_xml::events::BytesStart) -> InterpretationNode {
    InterpretationNode {
        content: attr_str(e, "content").unwrap_or_default(),
        children: Vec::new(),
    }
}

/// Attach a completed interpretation node to its parent on the stack, or to
/// the pending item's interpretation root when the stack is empty.
fn attach_interp(
    node: InterpretationNode,
    stack: &mut Vec<InterpretationNode>,
    pending: Option<&mut PendingItem>,
) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    } else if let Some(p) = pending {
        p.interpretation = Some(node);
    }
}

fn finalize_item(index: usize, p: PendingItem) -> TraceItem {
    let summary = TraceItem::summary_for(&p.interpretation);
    let timestamp = p.ts.compose();
    let (apdu, tlvs) = decode_payload(&p.item_type, p.raw_hex.as_deref());
    TraceItem {
        index,
        protocol: p.protocol,
        item_type: p.item_type,
        timestamp,
        raw_hex: p.raw_hex,
        interpretation: p.interpretation,
        summary,
        apdu,
        tlvs,
    }
}

/// Parse a full `<tracedata>/<traceitem>*` document into the canonical item
/// list, plus any parse-time warnings. Fails fatally only with `InvalidXml`
/// (malformed document or missing root); individual malformed `<traceitem>`
/// elements are recorded with empty interpretation and a `MalformedItem`
/// warning issue instead of aborting.
pub fn ingest_reader<R: BufRead>(
    reader: R,
    cancel: CancelCheck<'_>,
) -> Result<(Vec<TraceItem>, Vec<ValidationIssue>)> {
    let start = std::time::Instant::now();
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text = true;

    let mut items = Vec::new();
    let mut parse_issues = Vec::new();
    let mut saw_root = false;
    let mut index = 0usize;

    // Interpretation nodes nest arbitrarily; build with an explicit stack
    // rather than recursion so a pathological depth can't blow the call stack.
    let mut interp_stack: Vec<InterpretationNode> = Vec::new();
    let mut pending: Option<PendingItem> = None;
    let mut buf = Vec::new();

    loop {
        if let Some(check) = cancel {
            if check() {
                break;
            }
        }
        match xml.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => {
                let name = e.name().as_ref().to_vec();
                match name.as_slice() {
                    b"tracedata" => saw_root = true,
                    b"traceitem" => pending = Some(start_item(&e)),
                    b"data" => apply_data(&e, pending.as_mut(), index, &mut parse_issues),
                    b"interpretedresult" => interp_stack.push(start_interp(&e)),
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => {
                let name = e.name().as_ref().to_vec();
                match name.as_slice() {
                    b"data" => apply_data(&e, pending.as_mut(), index, &mut parse_issues),
                    b"interpretedresult" => {
                        // Self-closing leaf: attach directly, no matching End event to pop it.
                        let node = start_interp(&e);
                        attach_interp(node, &mut interp_stack, pending.as_mut());
                    }
                    _ => {}
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name().as_ref().to_vec();
                match name.as_slice() {
                    b"interpretedresult" => {
                        if let Some(node) = interp_stack.pop() {
                            attach_interp(node, &mut interp_stack, pending.as_mut());
                        }
                    }
                    b"traceitem" => {
                        if let Some(p) = pending.take() {
                            debug!(index, protocol = %p.protocol, item_type = %p.item_type, "ingested item");
                            items.push(finalize_item(index, p));
                            index += 1;
                        }
                    }
                    _ => {}
                }
            }
            Ok(_) => {}
            Err(e) => return Err(Error::InvalidXml(e.to_string())),
        }
        buf.clear();
    }

    if !saw_root {
        return Err(Error::InvalidXml("missing <tracedata> root element".to_string()));
    }

    info!(count = items.len(), elapsed_ms = start.elapsed().as_millis() as u64, "ingest complete");
    Ok((items, parse_issues))
}

fn decode_payload(
    item_type: &str,
    raw_hex: Option<&[u8]>,
) -> (Option<camtrace_types::Apdu>, Option<Vec<camtrace_types::Tlv>>) {
    let Some(bytes) = raw_hex else { return (None, None) };
    if bytes.is_empty() {
        return (None, None);
    }
    let apdu = classify_item_type(item_type).and_then(|kind| apdu_decode::decode(bytes, kind));
    let tlvs = {
        let parsed = parse_tlvs(bytes, 0);
        if parsed.is_empty() {
            None
        } else {
            Some(parsed)
        }
    };
    (apdu, tlvs)
}

pub fn ingest_bytes(bytes: &[u8], cancel: CancelCheck<'_>) -> Result<(Vec<TraceItem>, Vec<ValidationIssue>)> {
    ingest_reader(bytes, cancel)
}

pub fn ingest_path(
    path: &std::path::Path,
    cancel: CancelCheck<'_>,
) -> Result<(Vec<TraceItem>, Vec<ValidationIssue>)> {
    let file = std::fs::File::open(path)?;
    ingest_reader(std::io::BufReader::new(file), cancel)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<tracedata>
      <traceitem protocol="ISO7816" type="apducommand" year="2024" month="3" date="15" hour="10" minute="30" second="0" millisecond="0">
        <data rawhex="00 A4 04 00 02 3F 00"/>
        <interpretation>
          <interpretedresult content="SELECT"/>
        </interpretation>
      </traceitem>
      <traceitem protocol="ISO7816" type="apduresponse">
        <data rawhex="9000"/>
        <interpretation>
          <interpretedresult content="Status: 90 00">
            <interpretedresult content="Normal ending"/>
          </interpretedresult>
        </interpretation>
      </traceitem>
    </tracedata>"#;

    #[test]
    fn parses_items_in_order_with_dense_index() {
        let (items, _issues) = ingest_bytes(SAMPLE.as_bytes(), None).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].index, 0);
        assert_eq!(items[1].index, 1);
        assert_eq!(items[0].summary, "SELECT");
        assert_eq!(items[1].summary, "Status: 90 00");
    }

    #[test]
    fn nested_interpretation_preserved() {
        let (items, _issues) = ingest_bytes(SAMPLE.as_bytes(), None).unwrap();
        let interp = items[1].interpretation.as_ref().unwrap();
        assert_eq!(interp.children.len(), 1);
        assert_eq!(interp.children[0].content, "Normal ending");
    }

    #[test]
    fn decodes_command_and_response_apdus() {
        let (items, _issues) = ingest_bytes(SAMPLE.as_bytes(), None).unwrap();
        assert!(matches!(items[0].apdu, Some(camtrace_types::Apdu::Command { .. })));
        assert!(matches!(items[1].apdu, Some(camtrace_types::Apdu::Response { .. })));
    }

    #[test]
    fn timestamp_composed_when_present() {
        let (items, _issues) = ingest_bytes(SAMPLE.as_bytes(), None).unwrap();
        assert!(items[0].timestamp.is_some());
        assert!(items[1].timestamp.is_none());
    }

    #[test]
    fn missing_root_is_invalid_xml() {
        let err = ingest_bytes(b"<notroot/>", None).unwrap_err();
        assert!(matches!(err, Error::InvalidXml(_)));
    }

    #[test]
    fn mismatched_tags_are_invalid_xml() {
        let err = ingest_bytes(b"<tracedata><traceitem></wrong></tracedata>", None).unwrap_err();
        assert!(matches!(err, Error::InvalidXml(_)));
    }

    #[test]
    fn malformed_rawhex_is_recorded_as_a_warning_not_a_failure() {
        let xml = br#"<tracedata>
          <traceitem protocol="ISO7816" type="apducommand">
            <data rawhex="ZZZ"/>
          </traceitem>
        </tracedata>"#;
        let (items, issues) = ingest_bytes(xml, None).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].raw_hex, None);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].category, "MalformedItem");
        assert_eq!(issues[0].severity, camtrace_types::Severity::Warning);
        assert_eq!(issues[0].item_index, Some(0));
    }
}
