use bitstream_io::{BitWrite, BitWriter, Endianness};

use super::{
    ParseError, parse_domain_name, write_labels,
    enums::{RrClass, RrType},
};

/// One entry of the question section.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Question {
    pub labels: Vec<String>,
    pub qtype: RrType,
    pub qclass: RrClass,
}

impl Question {
    pub fn new(labels: Vec<String>, qtype: RrType, qclass: RrClass) -> Self {
        Self {
            labels,
            qtype,
            qclass,
        }
    }

    pub fn write<E: Endianness>(
        &self,
        writer: &mut BitWriter<&mut Vec<u8>, E>,
    ) -> Result<(), ParseError> {
        write_labels(writer, &self.labels)?;
        writer.write_var::<u16>(16, self.qtype.into())?;
        writer.write_var::<u16>(16, self.qclass.into())?;
        Ok(())
    }

    /// Parse one question starting at `offset`; returns the question and
    /// the offset just past it.
    pub fn parse(buf: &[u8], offset: usize) -> Result<(Self, usize), ParseError> {
        let (labels, next) = parse_domain_name(buf, offset)?;
        if next + 4 > buf.len() {
            return Err(ParseError::InvalidQuestionSection);
        }
        let qtype = u16::from_be_bytes([buf[next], buf[next + 1]]).into();
        let qclass = u16::from_be_bytes([buf[next + 2], buf[next + 3]]).into();
        Ok((
            Question {
                labels,
                qtype,
                qclass,
            },
            next + 4,
        ))
    }

    /// The question name in dotted form.
    pub fn name(&self) -> String {
        self.labels.join(".")
    }
}
