pub mod handshake;
pub mod record;
pub mod x509;

use camtrace_types::{
    AnalysisConfig, HandshakeBody, Severity, TlsContentType, TlsMessage, TlsRecord, ValidationIssue,
};

/// Build the ordered `tls_flow` for one direction buffer: handshake messages
/// parsed from Handshake records, plus CCS/Alert/ApplicationData markers, in
/// record order. After a ChangeCipherSpec, subsequent Handshake records are
/// opaque (`Encrypted Finished`) since their contents are encrypted.
pub fn tls_flow(buf: &[u8]) -> (Vec<TlsRecord>, Vec<TlsMessage>) {
    let records = record::walk_records(buf);
    let mut messages = Vec::new();
    let mut seen_ccs = false;

    for rec in &records {
        if rec.truncated {
            continue;
        }
        let Some(body) = buf.get(rec.body_offset..rec.body_offset + rec.length) else { continue };
        match rec.content_type {
            TlsContentType::Handshake => {
                if seen_ccs {
                    messages.push(TlsMessage::Handshake(camtrace_types::TlsHandshake {
                        msg_type: camtrace_types::HandshakeType::EncryptedFinished,
                        length: body.len(),
                        body: HandshakeBody::Opaque,
                    }));
                } else {
                    for hs in handshake::parse_handshake_messages(body) {
                        messages.push(TlsMessage::Handshake(hs));
                    }
                }
            }
            TlsContentType::ChangeCipherSpec => {
                seen_ccs = true;
                messages.push(TlsMessage::ChangeCipherSpec);
            }
            TlsContentType::Alert => {
                if body.len() >= 2 {
                    messages.push(TlsMessage::Alert { level: body[0], description: body[1] });
                }
            }
            TlsContentType::ApplicationData => {
                messages.push(TlsMessage::ApplicationData { length: body.len() });
            }
        }
    }

    (records, messages)
}

/// Compliance checks over a parsed flow: weak TLS version, non-approved
/// cipher, certificate validity window, self-signed (chain length 1).
pub fn compliance_issues(
    messages: &[TlsMessage],
    config: &AnalysisConfig,
    session_timestamp: Option<chrono::NaiveDateTime>,
    item_index: Option<usize>,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for message in messages {
        let TlsMessage::Handshake(hs) = message else { continue };
        match &hs.body {
            HandshakeBody::ClientHello(hello) | HandshakeBody::ServerHello(hello) => {
                if hello.version < (3, 3) {
                    issues.push(ValidationIssue::new(
                        Severity::Warning,
                        "TLS Compliance",
                        format!("negotiated below TLS 1.2: {}", camtrace_types::tls::version_name(hello.version)),
                        item_index,
                        session_timestamp,
                    ));
                }
                if !config.approved_ciphers.is_empty() {
                    let unapproved = hello
                        .cipher_suites
                        .iter()
                        .any(|c| !config.approved_ciphers.contains(c));
                    if unapproved {
                        issues.push(ValidationIssue::new(
                            Severity::Warning,
                            "TLS Compliance",
                            "cipher suite not on the approved list".to_string(),
                            item_index,
                            session_timestamp,
                        ));
                    }
                }
            }
            HandshakeBody::CertificateChain(chain) => {
                if chain.len() == 1 {
                    issues.push(ValidationIssue::new(
                        Severity::Warning,
                        "TLS Compliance",
                        "certificate chain has a single entry (self-signed)".to_string(),
                        item_index,
                        session_timestamp,
                    ));
                }
                if let Some(ts) = session_timestamp {
                    for cert in chain {
                        let outside = match (cert.not_before, cert.not_after) {
                            (Some(nb), Some(na)) => ts < nb || ts > na,
                            _ => false,
                        };
                        if outside {
                            issues.push(ValidationIssue::new(
                                Severity::Warning,
                                "TLS Compliance",
                                format!(
                                    "certificate validity window excludes session time ({:?})",
                                    cert.subject_cn
                                ),
                                item_index,
                                session_timestamp,
                            ));
                        }
                    }
                }
            }
            HandshakeBody::Opaque => {}
        }
    }

    issues
}
