use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Outcome of matching a FETCH (or proactive command) against its TERMINAL RESPONSE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PairStatus {
    Success,
    Error,
    Pending,
}

/// A single FETCH <-> TERMINAL RESPONSE correlation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pair {
    pub fetch_index: usize,
    pub response_index: Option<usize>,
    pub duration_ms: Option<i64>,
    pub status: PairStatus,
}

/// Full pairing result: both lookup directions, plus per-(protocol, channel)
/// ordered navigation lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pairing {
    pub pairs: Vec<Pair>,
    pub by_fetch: HashMap<usize, usize>,
    pub by_response: HashMap<usize, usize>,
    /// Keyed by `"{protocol}:{channel_id}"` (channel_id as `-1` when absent).
    pub by_context: HashMap<String, Vec<usize>>,
}

impl Pairing {
    pub fn context_key(protocol: &str, channel_id: Option<u8>) -> String {
        format!("{protocol}:{}", channel_id.map(|c| c as i16).unwrap_or(-1))
    }
}
