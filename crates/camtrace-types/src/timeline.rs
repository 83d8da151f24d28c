use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A merged chronological row produced by the Flow Builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TimelineRow {
    Session {
        channel_id: u8,
        /// Normalised display type, e.g. "DNS", "TAC", "BIP Session".
        kind: String,
        open_index: usize,
        close_index: Option<usize>,
        timestamp: Option<NaiveDateTime>,
    },
    Event {
        /// "Refresh" | "Cold Reset" | "ICCID" | "DNSbyME" | ...
        kind: String,
        item_index: usize,
        timestamp: Option<NaiveDateTime>,
        detail: Option<String>,
    },
}

impl TimelineRow {
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            TimelineRow::Session { timestamp, .. } => *timestamp,
            TimelineRow::Event { timestamp, .. } => *timestamp,
        }
    }

    /// The `type` label exposed to the Scenario Engine.
    pub fn kind(&self) -> &str {
        match self {
            TimelineRow::Session { kind, .. } => kind.as_str(),
            TimelineRow::Event { kind, .. } => kind.as_str(),
        }
    }

    pub fn anchor_index(&self) -> usize {
        match self {
            TimelineRow::Session { open_index, .. } => *open_index,
            TimelineRow::Event { item_index, .. } => *item_index,
        }
    }
}

/// Timeline filter mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowFilter {
    All,
    Sessions,
    Events,
}

impl FlowFilter {
    pub fn matches(&self, row: &TimelineRow) -> bool {
        match self {
            FlowFilter::All => true,
            FlowFilter::Sessions => matches!(row, TimelineRow::Session { .. }),
            FlowFilter::Events => matches!(row, TimelineRow::Event { .. }),
        }
    }
}
