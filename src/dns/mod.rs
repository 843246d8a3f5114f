//! DNS wire message model.
//!
//! The parse side handles full messages including name compression
//! (RFC 1035 §4.1.4); the build side writes names uncompressed, which is
//! all a transfer client needs for its queries.

pub mod enums;
pub mod header;
pub mod question;
pub mod record;

use bitstream_io::{BigEndian, BitWriter};
use header::Header;
use question::Question;
use record::Record;

/// The standard QUERY opcode.
pub const OPCODE_QUERY: u8 = 0;

#[derive(Debug)]
pub enum ParseError {
    InvalidHeader,
    InvalidLabel,
    InvalidQuestionSection,
    InvalidRecordSection,
    InvalidBitStream(String),
}

impl From<std::io::Error> for ParseError {
    fn from(e: std::io::Error) -> Self {
        ParseError::InvalidBitStream(e.to_string())
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::InvalidHeader => write!(f, "invalid DNS header"),
            ParseError::InvalidLabel => write!(f, "invalid DNS label"),
            ParseError::InvalidQuestionSection => write!(f, "invalid question section"),
            ParseError::InvalidRecordSection => write!(f, "invalid record section"),
            ParseError::InvalidBitStream(e) => write!(f, "invalid bit stream: {}", e),
        }
    }
}

impl std::error::Error for ParseError {}

/// One in-memory DNS message.
///
/// Built for outgoing queries, parsed from incoming responses. Transient:
/// it only lives for a single send/receive cycle plus one validation pass.
#[derive(Clone, Debug, Default)]
pub struct Message {
    pub header: Header,
    pub questions: Vec<Question>,
    pub answers: Vec<Record>,
    pub authorities: Vec<Record>,
    pub additionals: Vec<Record>,
}

impl Message {
    /// Parse a complete DNS message from its wire form (without any TCP
    /// length prefix). Name compression is resolved against `buf`.
    pub fn parse(buf: &[u8]) -> Result<Self, ParseError> {
        let header = Header::parse(buf)?;
        let mut offset = 12;
        let mut message = Message {
            header,
            ..Default::default()
        };

        for _ in 0..message.header.qdcount {
            let (question, next) = Question::parse(buf, offset)?;
            message.questions.push(question);
            offset = next;
        }
        for _ in 0..message.header.ancount {
            let (record, next) = Record::parse(buf, offset)?;
            message.answers.push(record);
            offset = next;
        }
        for _ in 0..message.header.nscount {
            let (record, next) = Record::parse(buf, offset)?;
            message.authorities.push(record);
            offset = next;
        }
        for _ in 0..message.header.arcount {
            let (record, next) = Record::parse(buf, offset)?;
            message.additionals.push(record);
            offset = next;
        }

        Ok(message)
    }

    /// Serialize the message. Names are written uncompressed.
    pub fn serialize(&self) -> Result<Vec<u8>, ParseError> {
        let mut buf = Vec::new();
        let mut writer: BitWriter<&mut Vec<u8>, BigEndian> = BitWriter::new(&mut buf);
        self.header.write(&mut writer)?;
        for question in &self.questions {
            question.write(&mut writer)?;
        }
        for record in &self.answers {
            record.write(&mut writer)?;
        }
        for record in &self.authorities {
            record.write(&mut writer)?;
        }
        for record in &self.additionals {
            record.write(&mut writer)?;
        }
        Ok(buf)
    }
}

/// Parse a (possibly compressed) domain name starting at `start`.
///
/// Returns the labels and the offset of the first byte after the name in
/// the original (non-pointer) position. Pointer chains are bounded to
/// guard against loops.
pub fn parse_domain_name(data: &[u8], start: usize) -> Result<(Vec<String>, usize), ParseError> {
    let mut labels = Vec::new();
    let mut offset = start;
    let mut jumps = 0;
    let mut end_after_pointer = None;

    loop {
        if offset >= data.len() {
            return Err(ParseError::InvalidLabel);
        }

        let len = data[offset];

        if (len & 0xC0) == 0xC0 {
            if offset + 1 >= data.len() {
                return Err(ParseError::InvalidLabel);
            }
            if end_after_pointer.is_none() {
                end_after_pointer = Some(offset + 2);
            }
            jumps += 1;
            if jumps > 5 {
                return Err(ParseError::InvalidLabel);
            }
            offset = u16::from_be_bytes([len & 0x3F, data[offset + 1]]) as usize;
            continue;
        }

        if len == 0 {
            return Ok((labels, end_after_pointer.unwrap_or(offset + 1)));
        }

        if len > 63 {
            return Err(ParseError::InvalidLabel);
        }

        offset += 1;
        let label_end = offset + len as usize;
        if label_end > data.len() {
            return Err(ParseError::InvalidLabel);
        }

        let label =
            String::from_utf8(data[offset..label_end].to_vec()).map_err(|_| ParseError::InvalidLabel)?;
        labels.push(label);
        offset = label_end;
    }
}

/// Write a domain name as a sequence of length-prefixed labels plus the
/// terminating root label. No compression on the build side.
pub(crate) fn write_labels<E: bitstream_io::Endianness>(
    writer: &mut BitWriter<&mut Vec<u8>, E>,
    labels: &[String],
) -> Result<(), ParseError> {
    use bitstream_io::BitWrite;

    for label in labels {
        if label.is_empty() {
            continue;
        }
        if label.len() > 63 {
            return Err(ParseError::InvalidLabel);
        }
        writer.write_var::<u8>(8, label.len() as u8)?;
        writer.write_bytes(label.as_bytes())?;
    }
    writer.write_var::<u8>(8, 0)?;
    Ok(())
}

/// Split a dotted zone name into labels, dropping the empty root label.
pub fn name_to_labels(name: &str) -> Vec<String> {
    name.split('.')
        .filter(|l| !l.is_empty())
        .map(|l| l.to_string())
        .collect()
}
