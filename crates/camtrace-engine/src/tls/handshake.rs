use camtrace_types::{Extension, HandshakeBody, HandshakeType, HelloMessage, TlsHandshake};

use super::x509::parse_certificate;

fn read_u16(buf: &[u8], off: usize) -> Option<u16> {
    buf.get(off..off + 2).map(|b| u16::from_be_bytes([b[0], b[1]]))
}

fn read_u24(buf: &[u8], off: usize) -> Option<usize> {
    buf.get(off..off + 3)
        .map(|b| ((b[0] as usize) << 16) | ((b[1] as usize) << 8) | b[2] as usize)
}

fn parse_extensions(buf: &[u8]) -> Vec<Extension> {
    let mut extensions = Vec::new();
    let Some(total_len) = read_u16(buf, 0) else { return extensions };
    let total_len = total_len as usize;
    let mut pos = 2;
    let end = (2 + total_len).min(buf.len());

    while pos + 4 <= end {
        let Some(ext_type) = read_u16(buf, pos) else { break };
        let Some(len) = read_u16(buf, pos + 2).map(|v| v as usize) else { break };
        let data_start = pos + 4;
        let Some(data) = buf.get(data_start..data_start + len) else { break };

        extensions.push(match ext_type {
            0 => parse_sni(data).unwrap_or(Extension::Unknown { ext_type, len }),
            10 => Extension::SupportedGroups(read_u16_list(data, 2)),
            13 => Extension::SignatureAlgorithms(read_u16_list(data, 2)),
            11 => Extension::EcPointFormats(read_u8_list(data)),
            1 => data.first().map(|b| Extension::MaxFragmentLength(*b)).unwrap_or(Extension::Unknown { ext_type, len }),
            16 => Extension::Alpn(read_alpn_list(data)),
            _ => Extension::Unknown { ext_type, len },
        });

        pos = data_start + len;
    }

    extensions
}

fn read_u16_list(data: &[u8], len_prefix_bytes: usize) -> Vec<u16> {
    let list = if len_prefix_bytes == 2 {
        match read_u16(data, 0) {
            Some(len) => data.get(2..2 + len as usize).unwrap_or(&[]),
            None => &[],
        }
    } else {
        data
    };
    list.chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]])).collect()
}

fn read_u8_list(data: &[u8]) -> Vec<u8> {
    match data.first() {
        Some(&len) => data.get(1..1 + len as usize).unwrap_or(&[]).to_vec(),
        None => Vec::new(),
    }
}

fn read_alpn_list(data: &[u8]) -> Vec<String> {
    let Some(list_len) = read_u16(data, 0) else { return Vec::new() };
    let Some(list) = data.get(2..2 + list_len as usize) else { return Vec::new() };
    let mut out = Vec::new();
    let mut pos = 0;
    while pos < list.len() {
        let len = list[pos] as usize;
        let Some(proto) = list.get(pos + 1..pos + 1 + len) else { break };
        out.push(String::from_utf8_lossy(proto).into_owned());
        pos += 1 + len;
    }
    out
}

fn parse_sni(data: &[u8]) -> Option<Extension> {
    let list_len = read_u16(data, 0)? as usize;
    let list = data.get(2..2 + list_len)?;
    if list.first()? != &0 {
        return None;
    }
    let name_len = read_u16(list, 1)? as usize;
    let name = list.get(3..3 + name_len)?;
    Some(Extension::ServerName(String::from_utf8_lossy(name).into_owned()))
}

/// Parse a ClientHello or ServerHello body. `is_client` distinguishes the
/// multi-valued ClientHello fields (cipher suite list, compression list)
/// from ServerHello's single chosen values.
fn parse_hello(body: &[u8], is_client: bool) -> Option<HelloMessage> {
    if body.len() < 34 {
        return None;
    }
    let version = (body[0], body[1]);
    let mut random = [0u8; 32];
    random.copy_from_slice(&body[2..34]);
    let mut pos = 34;

    let session_id_len = *body.get(pos)? as usize;
    pos += 1;
    let session_id = body.get(pos..pos + session_id_len)?.to_vec();
    pos += session_id_len;

    let cipher_suites = if is_client {
        let len = read_u16(body, pos)? as usize;
        pos += 2;
        let list = body.get(pos..pos + len)?;
        pos += len;
        list.chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]])).collect()
    } else {
        let suite = read_u16(body, pos)?;
        pos += 2;
        vec![suite]
    };

    let compression_methods = if is_client {
        let len = *body.get(pos)? as usize;
        pos += 1;
        let list = body.get(pos..pos + len)?.to_vec();
        pos += len;
        list
    } else {
        let method = *body.get(pos)?;
        pos += 1;
        vec![method]
    };

    let extensions = body.get(pos..).map(parse_extensions).unwrap_or_default();

    Some(HelloMessage {
        version,
        random,
        session_id,
        cipher_suites,
        compression_methods,
        extensions,
    })
}

fn parse_certificate_chain(body: &[u8]) -> HandshakeBody {
    let Some(list_len) = read_u24(body, 0) else { return HandshakeBody::CertificateChain(Vec::new()) };
    let list = body.get(3..3 + list_len).unwrap_or(&[]);
    let mut certs = Vec::new();
    let mut pos = 0;
    while pos + 3 <= list.len() {
        let Some(cert_len) = read_u24(list, pos) else { break };
        pos += 3;
        let Some(der) = list.get(pos..pos + cert_len) else { break };
        certs.push(parse_certificate(der));
        pos += cert_len;
    }
    HandshakeBody::CertificateChain(certs)
}

/// Parse a concatenated Handshake-record payload stream into individual
/// `msg_type(1) | length(3) | body` messages.
pub fn parse_handshake_messages(stream: &[u8]) -> Vec<TlsHandshake> {
    let mut messages = Vec::new();
    let mut offset = 0;

    while offset + 4 <= stream.len() {
        let msg_type = HandshakeType::from_byte(stream[offset]);
        let Some(length) = read_u24(stream, offset + 1) else { break };
        let body_start = offset + 4;
        let Some(body) = stream.get(body_start..body_start + length) else { break };

        let decoded = match msg_type {
            HandshakeType::ClientHello => {
                parse_hello(body, true).map(HandshakeBody::ClientHello).unwrap_or(HandshakeBody::Opaque)
            }
            HandshakeType::ServerHello => {
                parse_hello(body, false).map(HandshakeBody::ServerHello).unwrap_or(HandshakeBody::Opaque)
            }
            HandshakeType::Certificate => parse_certificate_chain(body),
            _ => HandshakeBody::Opaque,
        };

        messages.push(TlsHandshake { msg_type, length, body: decoded });
        offset = body_start + length;
    }

    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_hello_body(sni: &str) -> Vec<u8> {
        let mut body = vec![0x03, 0x03];
        body.extend([0u8; 32]);
        body.push(0); // session id len
        body.extend([0x00, 0x02, 0x13, 0x01]); // one cipher suite
        body.push(1); // compression methods len
        body.push(0);

        let host = sni.as_bytes();
        let mut sni_entry = vec![0u8];
        sni_entry.extend((host.len() as u16).to_be_bytes());
        sni_entry.extend(host);
        let mut sni_list = (sni_entry.len() as u16).to_be_bytes().to_vec();
        sni_list.extend(sni_entry);
        let mut ext = vec![0x00, 0x00];
        ext.extend((sni_list.len() as u16).to_be_bytes());
        ext.extend(sni_list);

        let mut extensions = (ext.len() as u16).to_be_bytes().to_vec();
        extensions.extend(ext);
        body.extend(extensions);
        body
    }

    fn wrap_handshake(msg_type: u8, body: &[u8]) -> Vec<u8> {
        let mut out = vec![msg_type];
        let len = body.len();
        out.extend([(len >> 16) as u8, (len >> 8) as u8, len as u8]);
        out.extend(body);
        out
    }

    #[test]
    fn client_hello_sni_extracted() {
        let body = client_hello_body("tac.example.com");
        let stream = wrap_handshake(1, &body);
        let messages = parse_handshake_messages(&stream);
        assert_eq!(messages.len(), 1);
        match &messages[0].body {
            HandshakeBody::ClientHello(hello) => {
                assert_eq!(hello.sni(), Some("tac.example.com"));
                assert_eq!(hello.version, (3, 3));
            }
            other => panic!("expected ClientHello, got {other:?}"),
        }
    }

    #[test]
    fn unknown_message_type_is_opaque() {
        let stream = wrap_handshake(99, &[0x01, 0x02]);
        let messages = parse_handshake_messages(&stream);
        assert!(matches!(messages[0].body, HandshakeBody::Opaque));
    }
}
