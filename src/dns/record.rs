use bitstream_io::{BitWrite, BitWriter, Endianness};

use super::{
    ParseError, parse_domain_name, write_labels,
    enums::{RrClass, RrType},
};

/// One resource record as received off the wire.
///
/// The rdata is kept as raw bytes: the transfer engine never interprets
/// record contents beyond the SOA serial, and passing rdata through
/// untouched preserves types this client does not model.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Record {
    pub labels: Vec<String>,
    pub rtype: RrType,
    pub rclass: RrClass,
    pub ttl: u32,
    pub rdata: Vec<u8>,
}

impl Record {
    /// Parse one record starting at `offset`; returns the record and the
    /// offset just past its rdata.
    pub fn parse(buf: &[u8], offset: usize) -> Result<(Self, usize), ParseError> {
        let (labels, next) = parse_domain_name(buf, offset)?;
        if next + 10 > buf.len() {
            return Err(ParseError::InvalidRecordSection);
        }
        let rtype = u16::from_be_bytes([buf[next], buf[next + 1]]).into();
        let rclass = u16::from_be_bytes([buf[next + 2], buf[next + 3]]).into();
        let ttl = u32::from_be_bytes([buf[next + 4], buf[next + 5], buf[next + 6], buf[next + 7]]);
        let rdlength = u16::from_be_bytes([buf[next + 8], buf[next + 9]]) as usize;

        let rdata_start = next + 10;
        let rdata_end = rdata_start + rdlength;
        if rdata_end > buf.len() {
            return Err(ParseError::InvalidRecordSection);
        }

        Ok((
            Record {
                labels,
                rtype,
                rclass,
                ttl,
                rdata: buf[rdata_start..rdata_end].to_vec(),
            },
            rdata_end,
        ))
    }

    pub fn write<E: Endianness>(
        &self,
        writer: &mut BitWriter<&mut Vec<u8>, E>,
    ) -> Result<(), ParseError> {
        write_labels(writer, &self.labels)?;
        writer.write_var::<u16>(16, self.rtype.into())?;
        writer.write_var::<u16>(16, self.rclass.into())?;
        writer.write_var::<u32>(32, self.ttl)?;
        writer.write_var::<u16>(16, self.rdata.len() as u16)?;
        writer.write_bytes(&self.rdata)?;
        Ok(())
    }

    /// The owner name in dotted form.
    pub fn name(&self) -> String {
        self.labels.join(".")
    }

    /// Extract the serial from an SOA record's rdata.
    ///
    /// SOA rdata is MNAME, RNAME, then five 32-bit values starting with
    /// the serial. Either name may end in a compression pointer (which
    /// occupies two bytes and terminates the name), so the walk only has
    /// to skip to the end of each name, never resolve it.
    pub fn soa_serial(&self) -> Option<u32> {
        if self.rtype != RrType::SOA {
            return None;
        }

        let rdata = &self.rdata;
        let mut offset = 0;

        for _ in 0..2 {
            loop {
                if offset >= rdata.len() {
                    return None;
                }
                let len = rdata[offset];
                if len == 0 {
                    offset += 1;
                    break;
                }
                if len & 0xC0 == 0xC0 {
                    offset += 2;
                    break;
                }
                offset += 1 + len as usize;
            }
        }

        if offset + 4 <= rdata.len() {
            Some(u32::from_be_bytes([
                rdata[offset],
                rdata[offset + 1],
                rdata[offset + 2],
                rdata[offset + 3],
            ]))
        } else {
            None
        }
    }
}
