/// Parsed DNS message. Decode never panics: malformed input
/// yields `Err(reason)` rather than propagating a structured error type,
/// since a single bad buffer must not abort the rest of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsMessage {
    pub id: u16,
    pub flags: u16,
    pub questions: Vec<Question>,
    pub answers: Vec<ResourceRecord>,
    pub authorities: Vec<ResourceRecord>,
    pub additionals: Vec<ResourceRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub qname: String,
    pub qtype: u16,
    pub qclass: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub name: String,
    pub rtype: u16,
    pub rclass: u16,
    pub ttl: u32,
    pub rdata: RData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RData {
    A(std::net::Ipv4Addr),
    Aaaa(std::net::Ipv6Addr),
    Name(String),
    Mx { preference: u16, exchange: String },
    Txt(Vec<String>),
    Srv { priority: u16, weight: u16, port: u16, target: String },
    Soa { mname: String, rname: String, serial: u32 },
    Raw(Vec<u8>),
}

const QTYPE_A: u16 = 1;
const QTYPE_NS: u16 = 2;
const QTYPE_CNAME: u16 = 5;
const QTYPE_SOA: u16 = 6;
const QTYPE_PTR: u16 = 12;
const QTYPE_MX: u16 = 15;
const QTYPE_TXT: u16 = 16;
const QTYPE_AAAA: u16 = 28;
const QTYPE_SRV: u16 = 33;

fn read_u16(buf: &[u8], off: usize) -> Result<u16, String> {
    buf.get(off..off + 2)
        .map(|b| u16::from_be_bytes([b[0], b[1]]))
        .ok_or_else(|| "truncated u16".to_string())
}

fn read_u32(buf: &[u8], off: usize) -> Result<u32, String> {
    buf.get(off..off + 4)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or_else(|| "truncated u32".to_string())
}

/// Decode a possibly-compressed domain name starting at `off`. Returns the
/// decoded name and the offset just past the name *as it appears in the
/// message*, i.e. past the first pointer if one was followed.
fn read_name(buf: &[u8], off: usize) -> Result<(String, usize), String> {
    let mut labels = Vec::new();
    let mut pos = off;
    let mut end = None;
    let mut jumps = 0;

    loop {
        if jumps > 32 {
            return Err("compression pointer loop".to_string());
        }
        let len = *buf.get(pos).ok_or("truncated name")? as usize;
        if len == 0 {
            pos += 1;
            if end.is_none() {
                end = Some(pos);
            }
            break;
        }
        if len & 0xC0 == 0xC0 {
            let hi = (len & 0x3F) as usize;
            let lo = *buf.get(pos + 1).ok_or("truncated pointer")? as usize;
            if end.is_none() {
                end = Some(pos + 2);
            }
            pos = (hi << 8) | lo;
            jumps += 1;
            continue;
        }
        let label = buf
            .get(pos + 1..pos + 1 + len)
            .ok_or("truncated label")?;
        labels.push(String::from_utf8_lossy(label).into_owned());
        pos += 1 + len;
    }

    Ok((labels.join("."), end.unwrap_or(pos)))
}

fn read_question(buf: &[u8], off: usize) -> Result<(Question, usize), String> {
    let (qname, mut pos) = read_name(buf, off)?;
    let qtype = read_u16(buf, pos)?;
    pos += 2;
    let qclass = read_u16(buf, pos)?;
    pos += 2;
    Ok((Question { qname, qtype, qclass }, pos))
}

fn read_rdata(buf: &[u8], rtype: u16, start: usize, len: usize) -> RData {
    let slice = buf.get(start..start + len).unwrap_or(&[]);
    match rtype {
        QTYPE_A if len == 4 => RData::A(std::net::Ipv4Addr::new(slice[0], slice[1], slice[2], slice[3])),
        QTYPE_AAAA if len == 16 => {
            let mut octets = [0u8; 16];
            octets.copy_from_slice(slice);
            RData::Aaaa(std::net::Ipv6Addr::from(octets))
        }
        QTYPE_NS | QTYPE_CNAME | QTYPE_PTR => read_name(buf, start)
            .map(|(n, _)| RData::Name(n))
            .unwrap_or(RData::Raw(slice.to_vec())),
        QTYPE_MX => {
            if let Ok(pref) = read_u16(buf, start) {
                let exchange = read_name(buf, start + 2).map(|(n, _)| n).unwrap_or_default();
                RData::Mx { preference: pref, exchange }
            } else {
                RData::Raw(slice.to_vec())
            }
        }
        QTYPE_TXT => {
            let mut strings = Vec::new();
            let mut p = 0;
            while p < slice.len() {
                let l = slice[p] as usize;
                if p + 1 + l > slice.len() {
                    break;
                }
                strings.push(String::from_utf8_lossy(&slice[p + 1..p + 1 + l]).into_owned());
                p += 1 + l;
            }
            RData::Txt(strings)
        }
        QTYPE_SRV => {
            if len >= 6 {
                let priority = u16::from_be_bytes([slice[0], slice[1]]);
                let weight = u16::from_be_bytes([slice[2], slice[3]]);
                let port = u16::from_be_bytes([slice[4], slice[5]]);
                let target = read_name(buf, start + 6).map(|(n, _)| n).unwrap_or_default();
                RData::Srv { priority, weight, port, target }
            } else {
                RData::Raw(slice.to_vec())
            }
        }
        QTYPE_SOA => {
            if let Ok((mname, p1)) = read_name(buf, start) {
                if let Ok((rname, p2)) = read_name(buf, p1) {
                    let serial = read_u32(buf, p2).unwrap_or(0);
                    return RData::Soa { mname, rname, serial };
                }
            }
            RData::Raw(slice.to_vec())
        }
        _ => RData::Raw(slice.to_vec()),
    }
}

fn read_record(buf: &[u8], off: usize) -> Result<(ResourceRecord, usize), String> {
    let (name, mut pos) = read_name(buf, off)?;
    let rtype = read_u16(buf, pos)?;
    pos += 2;
    let rclass = read_u16(buf, pos)?;
    pos += 2;
    let ttl = read_u32(buf, pos)?;
    pos += 4;
    let rdlength = read_u16(buf, pos)? as usize;
    pos += 2;
    if pos + rdlength > buf.len() {
        return Err("truncated rdata".to_string());
    }
    let rdata = read_rdata(buf, rtype, pos, rdlength);
    pos += rdlength;
    Ok((ResourceRecord { name, rtype, rclass, ttl, rdata }, pos))
}

/// Parse a DNS message from a UDP/53 payload. Fails softly: any structural
/// problem returns `Err(reason)` instead of a partial/garbage result.
pub fn parse(buf: &[u8]) -> Result<DnsMessage, String> {
    if buf.len() < 12 {
        return Err("message shorter than header".to_string());
    }
    let id = read_u16(buf, 0)?;
    let flags = read_u16(buf, 2)?;
    let qdcount = read_u16(buf, 4)? as usize;
    let ancount = read_u16(buf, 6)? as usize;
    let nscount = read_u16(buf, 8)? as usize;
    let arcount = read_u16(buf, 10)? as usize;

    let mut pos = 12;
    let mut questions = Vec::with_capacity(qdcount);
    for _ in 0..qdcount {
        let (q, next) = read_question(buf, pos)?;
        questions.push(q);
        pos = next;
    }

    let mut read_section = |count: usize, pos: &mut usize| -> Result<Vec<ResourceRecord>, String> {
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            let (rr, next) = read_record(buf, *pos)?;
            out.push(rr);
            *pos = next;
        }
        Ok(out)
    };

    let answers = read_section(ancount, &mut pos)?;
    let authorities = read_section(nscount, &mut pos)?;
    let additionals = read_section(arcount, &mut pos)?;

    if questions.len() != qdcount
        || answers.len() != ancount
        || authorities.len() != nscount
        || additionals.len() != arcount
    {
        return Err("section count mismatch".to_string());
    }

    Ok(DnsMessage { id, flags, questions, answers, authorities, additionals })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_bytes(labels: &[&str]) -> Vec<u8> {
        let mut out = Vec::new();
        for l in labels {
            out.push(l.len() as u8);
            out.extend(l.as_bytes());
        }
        out.push(0);
        out
    }

    #[test]
    fn parses_header_and_single_question() {
        let mut buf = vec![0x12, 0x34, 0x01, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        buf.extend(name_bytes(&["example", "com"]));
        buf.extend([0x00, 0x01, 0x00, 0x01]);
        let msg = parse(&buf).unwrap();
        assert_eq!(msg.id, 0x1234);
        assert_eq!(msg.questions.len(), 1);
        assert_eq!(msg.questions[0].qname, "example.com");
    }

    #[test]
    fn compression_pointer_resolved() {
        let mut buf = vec![0u8, 0, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0];
        let name_off = buf.len();
        buf.extend(name_bytes(&["a", "example", "com"]));
        buf.extend([0x00, 0x01, 0x00, 0x01]);
        // answer: name = pointer back to name_off, type A, class IN, ttl, rdlength 4, rdata
        buf.extend([0xC0, name_off as u8]);
        buf.extend([0x00, 0x01, 0x00, 0x01]);
        buf.extend([0x00, 0x00, 0x00, 0x3C]);
        buf.extend([0x00, 0x04]);
        buf.extend([10, 0, 0, 1]);
        let msg = parse(&buf).unwrap();
        assert_eq!(msg.answers.len(), 1);
        assert_eq!(msg.answers[0].name, "a.example.com");
        assert_eq!(msg.answers[0].rdata, RData::A(std::net::Ipv4Addr::new(10, 0, 0, 1)));
    }

    #[test]
    fn too_short_message_fails_softly() {
        assert!(parse(&[0u8; 4]).is_err());
    }
}
