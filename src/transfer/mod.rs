//! Inbound zone transfer engine.
//!
//! [`manager::TransferManager`] owns the command surface and concurrency
//! policy; [`connection::TransferConnection`] drives the AXFR protocol on
//! one TCP connection per accepted transfer.

pub mod connection;
pub mod manager;

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::dns::enums::RrClass;

/// A validated transfer request. Immutable once built; rejected inputs
/// never produce one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferRequest {
    pub zone_name: String,
    pub rclass: RrClass,
    pub master: SocketAddr,
    pub db_file: PathBuf,
}

/// Result of one completed transfer attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Fully consumed, correctly terminated AXFR stream; `records` counts
    /// the streamed records excluding the terminating SOA marker.
    Ok { records: u64 },
    Fail,
}
