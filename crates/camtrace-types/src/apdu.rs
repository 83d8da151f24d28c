use serde::{Deserialize, Serialize};

/// A parsed ISO-7816 command or response APDU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Apdu {
    Command {
        cla: u8,
        ins: u8,
        p1: u8,
        p2: u8,
        lc: Option<usize>,
        data: Vec<u8>,
        le: Option<usize>,
    },
    Response {
        sw1: u8,
        sw2: u8,
        data: Vec<u8>,
    },
}

impl Apdu {
    /// SW is a success status per §4.3: 90 00 or 91 xx.
    pub fn is_success(&self) -> bool {
        match self {
            Apdu::Response { sw1, sw2, .. } => (*sw1 == 0x90 && *sw2 == 0x00) || *sw1 == 0x91,
            Apdu::Command { .. } => false,
        }
    }

    pub fn status_word(&self) -> Option<(u8, u8)> {
        match self {
            Apdu::Response { sw1, sw2, .. } => Some((*sw1, *sw2)),
            Apdu::Command { .. } => None,
        }
    }

    pub fn as_command(&self) -> Option<(u8, u8, u8, u8, &[u8])> {
        match self {
            Apdu::Command {
                cla, ins, p1, p2, data, ..
            } => Some((*cla, *ins, *p1, *p2, data.as_slice())),
            Apdu::Response { .. } => None,
        }
    }
}

/// A proactive command recognised from a FETCH response's command-details TLV
/// (tag 0x81) or from the trace producer's own interpretation text.
///
/// The exact 7816 command-type byte per command is implementation-defined by
/// the trace producer; recognition therefore falls back to matching on the
/// interpretation summary when the TLV-coded type is ambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProactiveCommand {
    Fetch,
    TerminalResponse,
    OpenChannel,
    CloseChannel,
    SendData,
    ReceiveData,
    SetUpEventList,
    Refresh,
    SetUpCall,
    Select,
    ReadBinary,
    Envelope,
    Other,
}

impl ProactiveCommand {
    /// Command-type byte values as used by Universal-Tracer's own interpretation
    /// layer (the "0x00 marker used here as generic FETCH" convention from §4.2).
    pub fn from_command_type_byte(byte: u8) -> Self {
        match byte {
            0x00 => ProactiveCommand::Fetch,
            0x40 => ProactiveCommand::OpenChannel,
            0x41 => ProactiveCommand::CloseChannel,
            0x42 => ProactiveCommand::SendData,
            0x43 => ProactiveCommand::ReceiveData,
            0x05 => ProactiveCommand::SetUpEventList,
            0x01 => ProactiveCommand::Refresh,
            0x10 => ProactiveCommand::SetUpCall,
            _ => ProactiveCommand::Other,
        }
    }

    /// Fallback recognition from the item type / summary text when no
    /// command-details TLV was decodable.
    pub fn from_text(text: &str) -> Self {
        let t = text.to_ascii_lowercase();
        if t.contains("terminal response") {
            ProactiveCommand::TerminalResponse
        } else if t.contains("open channel") {
            ProactiveCommand::OpenChannel
        } else if t.contains("close channel") {
            ProactiveCommand::CloseChannel
        } else if t.contains("send data") {
            ProactiveCommand::SendData
        } else if t.contains("receive data") {
            ProactiveCommand::ReceiveData
        } else if t.contains("set up event list") {
            ProactiveCommand::SetUpEventList
        } else if t.contains("refresh") {
            ProactiveCommand::Refresh
        } else if t.contains("set up call") {
            ProactiveCommand::SetUpCall
        } else if t.contains("select") {
            ProactiveCommand::Select
        } else if t.contains("read binary") {
            ProactiveCommand::ReadBinary
        } else if t.contains("envelope") {
            ProactiveCommand::Envelope
        } else if t.contains("fetch") {
            ProactiveCommand::Fetch
        } else {
            ProactiveCommand::Other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_status_words() {
        let ok = Apdu::Response { sw1: 0x90, sw2: 0x00, data: vec![] };
        let ok2 = Apdu::Response { sw1: 0x91, sw2: 0x10, data: vec![] };
        let err = Apdu::Response { sw1: 0x6A, sw2: 0x82, data: vec![] };
        assert!(ok.is_success());
        assert!(ok2.is_success());
        assert!(!err.is_success());
    }

    #[test]
    fn text_recognition_is_case_insensitive() {
        assert_eq!(
            ProactiveCommand::from_text("OPEN CHANNEL"),
            ProactiveCommand::OpenChannel
        );
        assert_eq!(
            ProactiveCommand::from_text("Terminal Response"),
            ProactiveCommand::TerminalResponse
        );
    }
}
