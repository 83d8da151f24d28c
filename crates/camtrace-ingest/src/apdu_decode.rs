use camtrace_types::Apdu;

/// Which shape of APDU a raw buffer represents; derived from the trace
/// producer's own `type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApduKind {
    Command,
    Response,
}

pub fn classify_item_type(item_type: &str) -> Option<ApduKind> {
    let t = item_type.to_ascii_lowercase();
    if t.contains("command") {
        Some(ApduKind::Command)
    } else if t.contains("response") {
        Some(ApduKind::Response)
    } else {
        None
    }
}

/// Decode a command APDU: `CLA INS P1 P2 [Lc data] [Le]`.
///
/// Case 1 (no Lc/Le), case 2 (Le only), case 3 (Lc+data only), and case 4
/// (Lc+data+Le) are all accepted; anything shorter than the 4-byte header
/// fails to decode.
pub fn decode_command(buf: &[u8]) -> Option<Apdu> {
    if buf.len() < 4 {
        return None;
    }
    let (cla, ins, p1, p2) = (buf[0], buf[1], buf[2], buf[3]);
    let rest = &buf[4..];

    if rest.is_empty() {
        return Some(Apdu::Command { cla, ins, p1, p2, lc: None, data: Vec::new(), le: None });
    }
    if rest.len() == 1 {
        return Some(Apdu::Command {
            cla,
            ins,
            p1,
            p2,
            lc: None,
            data: Vec::new(),
            le: Some(rest[0] as usize),
        });
    }

    let lc = rest[0] as usize;
    let body = &rest[1..];
    if body.len() < lc {
        return None;
    }
    let data = body[..lc].to_vec();
    let trailer = &body[lc..];
    let le = match trailer.len() {
        0 => None,
        1 => Some(trailer[0] as usize),
        _ => return None,
    };

    Some(Apdu::Command { cla, ins, p1, p2, lc: Some(lc), data, le })
}

/// Decode a response APDU: body ending in `SW1 SW2`.
pub fn decode_response(buf: &[u8]) -> Option<Apdu> {
    if buf.len() < 2 {
        return None;
    }
    let (data, sw) = buf.split_at(buf.len() - 2);
    Some(Apdu::Response {
        sw1: sw[0],
        sw2: sw[1],
        data: data.to_vec(),
    })
}

pub fn decode(buf: &[u8], kind: ApduKind) -> Option<Apdu> {
    match kind {
        ApduKind::Command => decode_command(buf),
        ApduKind::Response => decode_response(buf),
    }
}
