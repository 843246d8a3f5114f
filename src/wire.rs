//! Query construction and TCP message framing.
//!
//! DNS over a stream transport prefixes every message with its length as
//! a 2-byte big-endian integer (RFC 1035 §4.2.2). The codec builds framed
//! queries and reads framed responses; it knows nothing about transfer
//! semantics.

use std::time::Duration;

use bitstream_io::{BigEndian, BitWriter};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::timeout;

use crate::dns::{
    Message, OPCODE_QUERY,
    enums::{RrClass, RrType},
    header::Header,
    name_to_labels,
    question::Question,
};
use crate::error::{Result, XfrError};

/// Build a framed standard query with a fresh random transaction id.
///
/// Returns the id alongside the bytes; the caller keeps it to validate
/// the response. The caller is responsible for sending.
pub fn build_query(zone_name: &str, rclass: RrClass, qtype: RrType) -> Result<(u16, Vec<u8>)> {
    let qid = rand::random::<u16>();
    let message = Message {
        header: Header {
            id: qid,
            qr: false,
            opcode: OPCODE_QUERY,
            qdcount: 1,
            ..Default::default()
        },
        questions: vec![Question::new(name_to_labels(zone_name), qtype, rclass)],
        ..Default::default()
    };

    let payload = message
        .serialize()
        .map_err(|e| XfrError::MalformedMessage(e.to_string()))?;
    Ok((qid, frame(&payload)))
}

/// Prefix a DNS payload with its 2-byte big-endian length.
pub fn frame(payload: &[u8]) -> Vec<u8> {
    let mut framed = Vec::with_capacity(payload.len() + 2);
    framed.extend_from_slice(&(payload.len() as u16).to_be_bytes());
    framed.extend_from_slice(payload);
    framed
}

/// Decode one unframed DNS payload into a message.
pub fn parse_response(payload: &[u8]) -> Result<Message> {
    Message::parse(payload).map_err(|e| XfrError::MalformedMessage(e.to_string()))
}

/// Read one framed message payload off the transport.
///
/// Each read is bounded by `idle_timeout`. Returns `Ok(None)` when the
/// peer closed the connection cleanly before sending any part of a frame;
/// the caller decides whether that is an orderly end or a protocol
/// failure. EOF inside a frame is always `IncompleteMessage`.
pub async fn read_frame<T>(transport: &mut T, idle_timeout: Duration) -> Result<Option<Vec<u8>>>
where
    T: AsyncRead + Unpin + ?Sized,
{
    let mut prefix = [0u8; 2];
    let mut have = 0;
    while have < 2 {
        let n = timeout(idle_timeout, transport.read(&mut prefix[have..]))
            .await
            .map_err(|_| XfrError::Timeout)?
            .map_err(|e| XfrError::MalformedMessage(format!("read failed: {}", e)))?;
        if n == 0 {
            if have == 0 {
                return Ok(None);
            }
            return Err(XfrError::IncompleteMessage { need: 2, got: have });
        }
        have += n;
    }

    let len = u16::from_be_bytes(prefix) as usize;
    let mut payload = vec![0u8; len];
    let mut read = 0;
    while read < len {
        let n = timeout(idle_timeout, transport.read(&mut payload[read..]))
            .await
            .map_err(|_| XfrError::Timeout)?
            .map_err(|e| XfrError::MalformedMessage(format!("read failed: {}", e)))?;
        if n == 0 {
            return Err(XfrError::IncompleteMessage {
                need: len,
                got: read,
            });
        }
        read += n;
    }

    Ok(Some(payload))
}
