//! muninn: an inbound DNS zone transfer (AXFR) engine.
//!
//! Given a zone name, RR class, and a master server address, muninn pulls
//! the full zone over TCP (RFC 5936), validates the wire protocol at
//! every step, and streams the records into a destination store. At most
//! one transfer runs per zone, with a global cap on concurrency.

pub mod config;
pub mod control;
pub mod dns;
pub mod error;
pub mod store;
pub mod transfer;
pub mod transport;
pub mod wire;

pub use config::XfrConfig;
pub use control::{CommandReply, ControlMessage};
pub use error::{Result, XfrError};
pub use transfer::manager::TransferManager;
pub use transfer::{TransferOutcome, TransferRequest};
