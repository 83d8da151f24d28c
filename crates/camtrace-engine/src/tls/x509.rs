use camtrace_types::Certificate;
use chrono::NaiveDate;

const TAG_SEQUENCE: u8 = 0x30;
const TAG_SET: u8 = 0x31;
const TAG_OID: u8 = 0x06;
const TAG_UTC_TIME: u8 = 0x17;
const TAG_GENERALIZED_TIME: u8 = 0x18;

const OID_COMMON_NAME: [u8; 3] = [0x55, 0x04, 0x03];
const OID_RSA_ENCRYPTION: [u8; 9] = [0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x01];
const OID_EC_PUBLIC_KEY: [u8; 7] = [0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x02, 0x01];
const OID_P256: [u8; 8] = [0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x03, 0x01, 0x07];

struct Node<'a> {
    tag: u8,
    content: &'a [u8],
}

/// Read one DER TLV at `offset`. Only the length-form widths actually used
/// in certificates are handled (short form and up to 4-byte long form).
fn read_der(buf: &[u8], offset: usize) -> Option<(Node<'_>, usize)> {
    let tag = *buf.get(offset)?;
    let len_byte = *buf.get(offset + 1)? as usize;
    let (len, header_len) = if len_byte < 0x80 {
        (len_byte, 2)
    } else {
        let n = len_byte & 0x7F;
        if n == 0 || n > 4 {
            return None;
        }
        let bytes = buf.get(offset + 2..offset + 2 + n)?;
        let len = bytes.iter().fold(0usize, |acc, b| (acc << 8) | *b as usize);
        (len, 2 + n)
    };
    let content = buf.get(offset + header_len..offset + header_len + len)?;
    Some((Node { tag, content }, offset + header_len + len))
}

#[derive(Default)]
struct Walked {
    common_names: Vec<String>,
    times: Vec<chrono::NaiveDateTime>,
    oids: Vec<Vec<u8>>,
}

/// Depth-first walk of the whole DER tree, collecting every CommonName RDN
/// value, every UTCTime/GeneralizedTime, and every OID, in document order.
/// This is deliberately not a field-accurate ASN.1 decoder: it relies on the
/// fixed relative order these elements appear in within a well-formed
/// certificate (issuer before subject, notBefore before notAfter) rather
/// than tracking exact SEQUENCE field positions.
fn walk(buf: &[u8], out: &mut Walked) {
    let mut offset = 0;
    let mut prev_was_cn_oid = false;
    while let Some((node, next)) = read_der(buf, offset) {
        match node.tag {
            TAG_SEQUENCE | TAG_SET => {
                walk(node.content, out);
                prev_was_cn_oid = false;
            }
            TAG_OID => {
                out.oids.push(node.content.to_vec());
                prev_was_cn_oid = node.content == OID_COMMON_NAME;
            }
            TAG_UTC_TIME => {
                if let Some(t) = parse_utc_time(node.content) {
                    out.times.push(t);
                }
                prev_was_cn_oid = false;
            }
            TAG_GENERALIZED_TIME => {
                if let Some(t) = parse_generalized_time(node.content) {
                    out.times.push(t);
                }
                prev_was_cn_oid = false;
            }
            0x0C | 0x13 | 0x16 | 0x14 if prev_was_cn_oid => {
                out.common_names.push(String::from_utf8_lossy(node.content).into_owned());
                prev_was_cn_oid = false;
            }
            _ => {
                prev_was_cn_oid = false;
            }
        }
        offset = next;
    }
}

fn parse_utc_time(b: &[u8]) -> Option<chrono::NaiveDateTime> {
    let s = std::str::from_utf8(b).ok()?;
    let s = s.trim_end_matches('Z');
    if s.len() < 10 {
        return None;
    }
    let yy: i32 = s[0..2].parse().ok()?;
    let year = if yy < 50 { 2000 + yy } else { 1900 + yy };
    build_time(year, &s[2..])
}

fn parse_generalized_time(b: &[u8]) -> Option<chrono::NaiveDateTime> {
    let s = std::str::from_utf8(b).ok()?;
    let s = s.trim_end_matches('Z');
    if s.len() < 12 {
        return None;
    }
    let year: i32 = s[0..4].parse().ok()?;
    build_time(year, &s[4..])
}

fn build_time(year: i32, rest: &str) -> Option<chrono::NaiveDateTime> {
    let month: u32 = rest.get(0..2)?.parse().ok()?;
    let day: u32 = rest.get(2..4)?.parse().ok()?;
    let hour: u32 = rest.get(4..6)?.parse().ok()?;
    let minute: u32 = rest.get(6..8)?.parse().ok()?;
    let second: u32 = rest.get(8..10).and_then(|s| s.parse().ok()).unwrap_or(0);
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)
}

fn key_type_from_oids(oids: &[Vec<u8>]) -> Option<String> {
    if oids.iter().any(|o| o.as_slice() == OID_RSA_ENCRYPTION) {
        return Some("RSA".to_string());
    }
    if oids.iter().any(|o| o.as_slice() == OID_EC_PUBLIC_KEY) {
        if oids.iter().any(|o| o.as_slice() == OID_P256) {
            return Some("EC (P-256)".to_string());
        }
        return Some("EC".to_string());
    }
    None
}

/// Minimally decode one DER-encoded X.509 certificate. Never fails: fields
/// that can't be located are simply left `None`.
pub fn parse_certificate(der: &[u8]) -> Certificate {
    let mut walked = Walked::default();
    walk(der, &mut walked);
    Certificate {
        issuer_cn: walked.common_names.first().cloned(),
        subject_cn: walked.common_names.get(1).cloned(),
        not_before: walked.times.first().copied(),
        not_after: walked.times.get(1).copied(),
        key_type: key_type_from_oids(&walked.oids),
        raw_len: der.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn der_len(len: usize) -> Vec<u8> {
        if len < 0x80 {
            vec![len as u8]
        } else {
            vec![0x81, len as u8]
        }
    }

    fn der(tag: u8, content: &[u8]) -> Vec<u8> {
        let mut out = vec![tag];
        out.extend(der_len(content.len()));
        out.extend(content);
        out
    }

    #[test]
    fn extracts_cn_and_validity_from_minimal_structure() {
        let cn_oid = der(TAG_OID, &OID_COMMON_NAME);
        let cn_value = der(0x0C, b"issuer.example.com");
        let rdn = der(TAG_SEQUENCE, &[cn_oid.clone(), cn_value].concat());
        let issuer_name = der(TAG_SET, &rdn);

        let cn_value2 = der(0x0C, b"leaf.example.com");
        let rdn2 = der(TAG_SEQUENCE, &[cn_oid.clone(), cn_value2].concat());
        let subject_name = der(TAG_SET, &rdn2);

        let not_before = der(TAG_UTC_TIME, b"240101000000Z");
        let not_after = der(TAG_UTC_TIME, b"250101000000Z");

        let rsa_oid = der(TAG_OID, &OID_RSA_ENCRYPTION);

        let body: Vec<u8> = [issuer_name, not_before, not_after, subject_name, rsa_oid]
            .concat();
        let cert_der = der(TAG_SEQUENCE, &body);

        let cert = parse_certificate(&cert_der);
        assert_eq!(cert.issuer_cn.as_deref(), Some("issuer.example.com"));
        assert_eq!(cert.subject_cn.as_deref(), Some("leaf.example.com"));
        assert_eq!(cert.key_type.as_deref(), Some("RSA"));
        assert!(cert.not_before.is_some());
        assert!(cert.not_after.is_some());
    }

    #[test]
    fn unparseable_bytes_never_panics() {
        let cert = parse_certificate(&[0xFF, 0xFF]);
        assert_eq!(cert.issuer_cn, None);
    }
}
