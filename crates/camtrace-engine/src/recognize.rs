use camtrace_types::{ProactiveCommand, TraceItem};
use once_cell::sync::OnceCell;
use regex::Regex;

/// Recognise a trace item's proactive-command kind. The item's own `type`
/// attribute is authoritative when it already names FETCH / TERMINAL RESPONSE;
/// otherwise falls back to scanning the interpretation summary text.
pub fn proactive_kind(item: &TraceItem) -> Option<ProactiveCommand> {
    if item.type_contains("terminalresponse") || item.type_contains("terminal response") {
        return Some(ProactiveCommand::TerminalResponse);
    }
    if item.type_contains("fetch") {
        return Some(ProactiveCommand::Fetch);
    }
    let kind = ProactiveCommand::from_text(&item.summary);
    if matches!(kind, ProactiveCommand::Other) {
        None
    } else {
        Some(kind)
    }
}

/// True for every proactive command that should be paired against a later
/// TERMINAL RESPONSE (everything except TERMINAL RESPONSE itself).
pub fn is_fetch_like(kind: ProactiveCommand) -> bool {
    !matches!(kind, ProactiveCommand::TerminalResponse | ProactiveCommand::Other)
}

fn channel_regex() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?i)channel\s*(?:id)?\s*[:#]?\s*(\d+)").unwrap())
}

/// Extract a BIP channel id from an item's interpretation text, when present.
/// Universal-Tracer interpretation nodes carry free text like "Channel: 1" or
/// "Channel id 01".
pub fn channel_id_of(item: &TraceItem) -> Option<u8> {
    let interp = item.interpretation.as_ref()?;
    for content in interp.contents() {
        if let Some(caps) = channel_regex().captures(content) {
            if let Ok(id) = caps[1].parse::<u8>() {
                return Some(id);
            }
        }
    }
    None
}
