use crate::dns;

/// Primary protocol label assigned to a reassembled direction buffer.
/// Classification is non-destructive; this is the single
/// "first matching classifier wins" label, evaluated in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Tls,
    Dns,
    Json,
    Http,
    Asn1,
    Binary,
}

const TLS_CONTENT_TYPES: [u8; 4] = [0x14, 0x15, 0x16, 0x17];
const TLS_VERSIONS: [(u8, u8); 4] = [(0x03, 0x01), (0x03, 0x02), (0x03, 0x03), (0x03, 0x04)];

fn looks_like_tls(buf: &[u8]) -> bool {
    buf.len() >= 5 && TLS_CONTENT_TYPES.contains(&buf[0]) && TLS_VERSIONS.contains(&(buf[1], buf[2]))
}

fn looks_like_http(buf: &[u8]) -> bool {
    buf.starts_with(b"GET ") || buf.starts_with(b"POST ") || buf.starts_with(b"HTTP/")
}

fn looks_like_asn1(buf: &[u8]) -> bool {
    let Some(&first) = buf.first() else { return false };
    if !(first == 0x30 || first == 0x31 || (0xA0..=0xBF).contains(&first)) {
        return false;
    }
    let Some(&len_byte) = buf.get(1) else { return false };
    let declared = if len_byte < 0x80 {
        len_byte as usize
    } else {
        let n = (len_byte & 0x7F) as usize;
        if n == 0 || n > 4 || buf.len() < 2 + n {
            return false;
        }
        buf[2..2 + n].iter().fold(0usize, |acc, b| (acc << 8) | *b as usize)
    };
    let header_len = if len_byte < 0x80 { 2 } else { 2 + (len_byte & 0x7F) as usize };
    declared <= buf.len().saturating_sub(header_len)
}

/// Classify a direction buffer. `is_udp_53` signals the transport-layer hint
/// that gates DNS detection, independent of the buffer's own bytes.
pub fn classify(buf: &[u8], is_udp_53: bool) -> Protocol {
    if looks_like_tls(buf) {
        return Protocol::Tls;
    }
    if is_udp_53 && dns::parse(buf).is_ok() {
        return Protocol::Dns;
    }
    if buf.first() == Some(&b'{') && serde_json::from_slice::<serde_json::Value>(buf).is_ok() {
        return Protocol::Json;
    }
    if looks_like_http(buf) {
        return Protocol::Http;
    }
    if looks_like_asn1(buf) {
        return Protocol::Asn1;
    }
    Protocol::Binary
}
