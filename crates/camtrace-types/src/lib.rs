//! Canonical data model shared by every camtrace crate.
//!
//! Derived structures (pairs, sessions, payload streams, TLS messages,
//! validation issues, timeline rows, scenario results) reference trace items by
//! `index` rather than by pointer, so the trace model itself can stay immutable
//! and shared.

pub mod apdu;
pub mod config;
pub mod error;
pub mod item;
pub mod pairing;
pub mod payload;
pub mod scenario;
pub mod session;
pub mod timeline;
pub mod tls;
pub mod tlv;
pub mod validation;

pub use apdu::{Apdu, ProactiveCommand};
pub use config::{AnalysisConfig, HostnamePattern, IpRolePattern};
pub use error::{Error, Result};
pub use item::{InterpretationNode, TraceItem};
pub use pairing::{Pair, PairStatus, Pairing};
pub use payload::{Direction, OffsetSpan, PayloadStream};
pub use scenario::{
    GapConstraints, Presence, Scenario, ScenarioResult, ScenarioStep, Scope, StepKind,
    StepOutcome, StepResult,
};
pub use session::{ChannelSession, Role, Transport};
pub use timeline::{FlowFilter, TimelineRow};
pub use tls::{
    Certificate, Extension, HandshakeBody, HandshakeType, HelloMessage, TlsContentType,
    TlsHandshake, TlsMessage, TlsRecord,
};
pub use tlv::{find_tag, Tlv};
pub use validation::{sort_issues, Severity, ValidationIssue};

/// The full immutable trace model produced by ingestion.
#[derive(Debug, Clone)]
pub struct TraceModel {
    pub items: Vec<TraceItem>,
    /// Warnings raised while parsing the document itself (e.g. a
    /// `<traceitem>` with a malformed `rawhex` attribute), merged into
    /// [`validation::ValidationIssue`] output alongside the item-scoped scan.
    pub parse_issues: Vec<ValidationIssue>,
}

impl TraceModel {
    pub fn item(&self, index: usize) -> Option<&TraceItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
