//! Session reconstruction, payload reassembly, protocol classification, TLS
//! and DNS analysis, validation, flow timeline and scenario matching.
//!
//! Each function here corresponds to one analytical stage over an immutable
//! [`camtrace_types::TraceModel`]; stages are independent and read-only.

pub mod classify;
pub mod dns;
pub mod error;
pub mod flow;
pub mod pairing;
pub mod payload;
pub mod recognize;
pub mod scenario;
pub mod session;
pub mod tls;
pub mod validator;

pub use error::{Error, Result};

use std::collections::HashSet;

use camtrace_types::{
    AnalysisConfig, ChannelSession, Direction, Pairing, Scenario, ScenarioResult, Severity,
    TimelineRow, TlsMessage, TlsRecord, TraceModel, ValidationIssue,
};

/// Checked between top-level loop iterations in every stage below.
pub type CancelCheck<'a> = Option<&'a dyn Fn() -> bool>;

fn cancelled(cancel: CancelCheck<'_>) -> bool {
    cancel.map(|check| check()).unwrap_or(false)
}

/// FETCH / TERMINAL RESPONSE pairing.
pub fn pairs(model: &TraceModel) -> Pairing {
    pairing::pair(&model.items)
}

/// Reconstruct channel sessions and resolve their roles, running TLS-based
/// SNI detection capped to the first `role_detection_item_cap` items of each
/// session.
pub fn sessions(model: &TraceModel, config: &AnalysisConfig) -> (Vec<ChannelSession>, Vec<ValidationIssue>) {
    let reconstructed = session::reconstruct(&model.items);
    let mut sessions = reconstructed.sessions;

    for s in &mut sessions {
        let capped_indices: Vec<usize> = s
            .item_indices
            .iter()
            .take(config.role_detection_item_cap)
            .copied()
            .collect();
        let mut capped = s.clone();
        capped.item_indices = capped_indices;
        let streams = payload::reassemble(&capped, &model.items);

        let sni = streams
            .get(&Direction::MeToSim)
            .map(|stream| tls::tls_flow(&stream.bytes).1)
            .and_then(|messages| first_client_hello_sni(&messages));

        session::detect_role(s, sni.as_deref(), config);
    }

    (sessions, reconstructed.issues)
}

fn first_client_hello_sni(messages: &[TlsMessage]) -> Option<String> {
    messages.iter().find_map(|m| match m {
        TlsMessage::Handshake(hs) => match &hs.body {
            camtrace_types::HandshakeBody::ClientHello(hello) => hello.sni().map(str::to_string),
            _ => None,
        },
        _ => None,
    })
}

/// Reassemble and classify/parse both direction streams of a session's TLS
/// traffic. Used both by `tls_flow` and by `validate` for compliance issues.
pub fn session_tls(model: &TraceModel, session: &ChannelSession) -> Vec<(Direction, Vec<TlsRecord>, Vec<TlsMessage>)> {
    let streams = payload::reassemble(session, &model.items);
    streams
        .into_iter()
        .map(|(direction, stream)| {
            let (records, messages) = tls::tls_flow(&stream.bytes);
            (direction, records, messages)
        })
        .collect()
}

/// The decoded TLS flow for one session+direction.
pub fn tls_flow(model: &TraceModel, session: &ChannelSession, direction: Direction) -> (Vec<TlsRecord>, Vec<TlsMessage>) {
    session_tls(model, session)
        .into_iter()
        .find(|(d, _, _)| *d == direction)
        .map(|(_, records, messages)| (records, messages))
        .unwrap_or_default()
}

/// Full validation pass: item-scoped issues, session state-machine issues,
/// and per-session TLS compliance issues, sorted chronologically.
pub fn validate(model: &TraceModel, config: &AnalysisConfig) -> Vec<ValidationIssue> {
    let (sessions, mut issues) = sessions(model, config);
    issues.extend(model.parse_issues.iter().cloned());
    issues.extend(validator::scan(&model.items));

    for session in &sessions {
        for (_direction, _records, messages) in session_tls(model, session) {
            issues.extend(tls::compliance_issues(
                &messages,
                config,
                session.opened_at,
                Some(session.open_index),
            ));
        }
    }

    camtrace_types::sort_issues(&mut issues);
    issues
}

/// Merged chronological Session/Event timeline.
pub fn flow(model: &TraceModel, config: &AnalysisConfig) -> Vec<TimelineRow> {
    let (sessions, _issues) = sessions(model, config);
    flow::build_flow(&model.items, &sessions)
}

/// Evaluate a scenario against the model's flow timeline.
pub fn run_scenario(model: &TraceModel, scenario_def: &Scenario, config: &AnalysisConfig) -> Result<ScenarioResult> {
    if scenario_def.sequence.is_empty() {
        return Err(Error::EmptyScenario);
    }
    let timeline = flow(model, config);
    let issues = validate(model, config);
    let critical_indices: HashSet<usize> = issues
        .iter()
        .filter(|i| i.severity == Severity::Critical)
        .filter_map(|i| i.item_index)
        .collect();
    Ok(scenario::run(&timeline, scenario_def, &critical_indices))
}
