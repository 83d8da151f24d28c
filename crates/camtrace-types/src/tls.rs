use serde::{Deserialize, Serialize};

/// TLS record content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TlsContentType {
    ChangeCipherSpec,
    Alert,
    Handshake,
    ApplicationData,
}

impl TlsContentType {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            20 => Some(Self::ChangeCipherSpec),
            21 => Some(Self::Alert),
            22 => Some(Self::Handshake),
            23 => Some(Self::ApplicationData),
            _ => None,
        }
    }
}

/// One record-layer frame within a reassembled direction buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsRecord {
    pub content_type: TlsContentType,
    pub version: (u8, u8),
    pub length: usize,
    pub body_offset: usize,
    /// True when `length` exceeded the remaining bytes; reassembly stopped here.
    pub truncated: bool,
}

pub fn version_name(version: (u8, u8)) -> &'static str {
    match version {
        (3, 1) => "TLS 1.0",
        (3, 2) => "TLS 1.1",
        (3, 3) => "TLS 1.2",
        (3, 4) => "TLS 1.3",
        _ => "Unknown",
    }
}

/// Handshake message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandshakeType {
    ClientHello,
    ServerHello,
    Certificate,
    ServerKeyExchange,
    ServerHelloDone,
    ClientKeyExchange,
    Finished,
    EncryptedFinished,
    Other(u8),
}

impl HandshakeType {
    pub fn from_byte(b: u8) -> Self {
        match b {
            1 => Self::ClientHello,
            2 => Self::ServerHello,
            11 => Self::Certificate,
            12 => Self::ServerKeyExchange,
            14 => Self::ServerHelloDone,
            16 => Self::ClientKeyExchange,
            20 => Self::Finished,
            other => Self::Other(other),
        }
    }
}

/// A named TLS extension decoded from a ClientHello/ServerHello.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Extension {
    ServerName(String),
    SupportedGroups(Vec<u16>),
    SignatureAlgorithms(Vec<u16>),
    EcPointFormats(Vec<u8>),
    MaxFragmentLength(u8),
    Alpn(Vec<String>),
    Unknown { ext_type: u16, len: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    pub version: (u8, u8),
    pub random: [u8; 32],
    pub session_id: Vec<u8>,
    /// Offered cipher suites (ClientHello) or the chosen one (ServerHello, len 1).
    pub cipher_suites: Vec<u16>,
    pub compression_methods: Vec<u8>,
    pub extensions: Vec<Extension>,
}

impl HelloMessage {
    pub fn sni(&self) -> Option<&str> {
        self.extensions.iter().find_map(|e| match e {
            Extension::ServerName(name) => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn alpn(&self) -> Option<&[String]> {
        self.extensions.iter().find_map(|e| match e {
            Extension::Alpn(protos) => Some(protos.as_slice()),
            _ => None,
        })
    }
}

/// Minimally-decoded X.509 certificate: subject/issuer CN,
/// validity window, key type. No signature verification is performed (Non-goal).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certificate {
    pub subject_cn: Option<String>,
    pub issuer_cn: Option<String>,
    pub not_before: Option<chrono::NaiveDateTime>,
    pub not_after: Option<chrono::NaiveDateTime>,
    pub key_type: Option<String>,
    pub raw_len: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HandshakeBody {
    ClientHello(HelloMessage),
    ServerHello(HelloMessage),
    CertificateChain(Vec<Certificate>),
    /// Tagged by message type only
    Opaque,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsHandshake {
    pub msg_type: HandshakeType,
    pub length: usize,
    pub body: HandshakeBody,
}

/// One decoded element of a direction's TLS flow, in order: records, handshake
/// messages, and opaque application-data/alert/CCS markers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TlsMessage {
    Handshake(TlsHandshake),
    ChangeCipherSpec,
    Alert { level: u8, description: u8 },
    ApplicationData { length: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_names() {
        assert_eq!(version_name((3, 3)), "TLS 1.2");
        assert_eq!(version_name((3, 4)), "TLS 1.3");
        assert_eq!(version_name((9, 9)), "Unknown");
    }

    #[test]
    fn sni_extracted_from_extensions() {
        let hello = HelloMessage {
            version: (3, 3),
            random: [0u8; 32],
            session_id: vec![],
            cipher_suites: vec![0x1301],
            compression_methods: vec![0],
            extensions: vec![Extension::ServerName("tac.example.com".to_string())],
        };
        assert_eq!(hello.sni(), Some("tac.example.com"));
    }
}
