use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Transport inferred for a channel session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transport {
    Tcp,
    Udp,
    Unknown,
}

/// Inferred remote-endpoint role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    SmDpPlus,
    SmDs,
    Eim,
    DpPlus,
    Tac,
    Dns,
    Unknown,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::SmDpPlus => "SM-DP+",
            Role::SmDs => "SM-DS",
            Role::Eim => "eIM",
            Role::DpPlus => "DP+",
            Role::Tac => "TAC",
            Role::Dns => "DNS",
            Role::Unknown => "Unknown",
        }
    }
}

/// One OPEN -> CLOSE (or OPEN -> end-of-trace) lifecycle for a BIP channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSession {
    pub channel_id: u8,
    pub open_index: usize,
    pub close_index: Option<usize>,
    pub item_indices: Vec<usize>,

    pub server_name: Option<String>,
    pub ip_addresses: BTreeSet<String>,
    pub port: Option<u16>,
    pub transport: Transport,
    pub role: Role,

    pub opened_at: Option<NaiveDateTime>,
    pub closed_at: Option<NaiveDateTime>,

    pub label: String,
}

impl ChannelSession {
    pub fn new(channel_id: u8, open_index: usize) -> Self {
        Self {
            channel_id,
            open_index,
            close_index: None,
            item_indices: Vec::new(),
            server_name: None,
            ip_addresses: BTreeSet::new(),
            port: None,
            transport: Transport::Unknown,
            role: Role::Unknown,
            opened_at: None,
            closed_at: None,
            label: "BIP Session".to_string(),
        }
    }

    pub fn duration(&self) -> Option<chrono::Duration> {
        match (self.opened_at, self.closed_at) {
            (Some(o), Some(c)) => Some(c - o),
            _ => None,
        }
    }

    /// Normalise the display label: "DNS" when the server is
    /// Google DNS, "BIP Session" when there is no server and the session is a
    /// bare Open Channel group.
    pub fn normalise_label(&mut self) {
        self.label = if self.server_name.as_deref() == Some("Google DNS") {
            "DNS".to_string()
        } else if self.server_name.is_none() {
            "BIP Session".to_string()
        } else {
            self.server_name.clone().unwrap()
        };
    }
}
