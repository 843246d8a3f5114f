//! Transfer dispatch, tracking, and rate limiting.
//!
//! The manager is the command surface of the engine: it validates
//! parameters, enforces the one-transfer-per-zone rule and the global
//! `transfers_in` quota, and spawns one tokio task per accepted transfer.
//! Commands are fire-and-forget: acceptance is reported immediately and
//! the outcome is observable only through logs and the zone store.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Map, Value};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::XfrConfig;
use crate::control::CommandReply;
use crate::dns::enums::RrClass;
use crate::error::{Result, XfrError};
use crate::store::{FileZoneSinkFactory, ZoneSinkFactory};
use crate::transfer::{TransferOutcome, TransferRequest, connection::TransferConnection};
use crate::transport::{TcpTransportFactory, TransportFactory};

pub const DEFAULT_MASTER_PORT: u16 = 53;

/// Command arguments as delivered by the control channel.
pub type CommandArgs = Map<String, Value>;

type CommandHook = Box<dyn Fn(&str) + Send + Sync>;

/// Registry and policy state, mutated only under one lock.
///
/// The lock serializes slot checks and reservations against each other;
/// it is never held across connection work.
struct ManagerState {
    transfers_in: usize,
    active: HashMap<String, JoinHandle<()>>,
}

pub struct TransferManager {
    state: Arc<Mutex<ManagerState>>,
    config: XfrConfig,
    transport_factory: Arc<dyn TransportFactory>,
    sink_factory: Arc<dyn ZoneSinkFactory>,
    command_hook: Option<CommandHook>,
}

impl TransferManager {
    pub fn new(
        config: XfrConfig,
        transport_factory: Arc<dyn TransportFactory>,
        sink_factory: Arc<dyn ZoneSinkFactory>,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(ManagerState {
                transfers_in: config.transfers_in,
                active: HashMap::new(),
            })),
            config,
            transport_factory,
            sink_factory,
            command_hook: None,
        }
    }

    /// Production wiring: plain TCP transports and file-backed zone
    /// stores.
    pub fn with_defaults(config: XfrConfig) -> Self {
        let connect_timeout = config.connect_timeout;
        Self::new(
            config,
            Arc::new(TcpTransportFactory::new(connect_timeout)),
            Arc::new(FileZoneSinkFactory),
        )
    }

    /// Install an observation callback invoked on every received command.
    /// Tests use this to assert that the command path was exercised.
    pub fn with_command_hook(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.command_hook = Some(Box::new(hook));
        self
    }

    /// Validate and normalize command parameters into a TransferRequest.
    pub fn parse_request(&self, args: &CommandArgs) -> Result<TransferRequest> {
        let zone_name = args
            .get("zone_name")
            .and_then(Value::as_str)
            .ok_or_else(|| XfrError::BadParameters("zone_name is mandatory".to_string()))?
            .to_string();

        let master_str = args
            .get("master")
            .and_then(Value::as_str)
            .ok_or_else(|| XfrError::BadParameters("master address is mandatory".to_string()))?;
        let master_ip: IpAddr = master_str.parse().map_err(|_| {
            XfrError::BadParameters(format!("invalid master address: {}", master_str))
        })?;

        let port = match args.get("port") {
            None => DEFAULT_MASTER_PORT,
            Some(value) => parse_port(value)?,
        };

        let rclass = match args.get("class").and_then(Value::as_str) {
            None => RrClass::IN,
            Some(s) => s
                .parse()
                .map_err(|_| XfrError::BadParameters(format!("invalid RR class: {}", s)))?,
        };

        let db_file = match args.get("db_file").and_then(Value::as_str) {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(format!("{}.db", zone_name.trim_end_matches('.'))),
        };

        Ok(TransferRequest {
            zone_name,
            rclass,
            master: SocketAddr::new(master_ip, port),
            db_file,
        })
    }

    /// Handle one control command. `retransfer` and `refresh` differ only
    /// in whether the SOA pre-check runs before the AXFR.
    pub fn handle_command(&self, name: &str, args: Option<&CommandArgs>) -> CommandReply {
        if let Some(hook) = &self.command_hook {
            hook(name);
        }
        debug!("received command {}", name);

        match name {
            "retransfer" => self.handle_transfer_command(args, false),
            "refresh" => self.handle_transfer_command(args, true),
            // the control loop stops feeding us afterwards; in-flight
            // transfers run to completion
            "shutdown" => CommandReply::ok("shutting down"),
            other => CommandReply::error(format!("unknown command: {}", other)),
        }
    }

    fn handle_transfer_command(&self, args: Option<&CommandArgs>, do_soa_check: bool) -> CommandReply {
        let empty = CommandArgs::new();
        let args = args.unwrap_or(&empty);
        match self
            .parse_request(args)
            .and_then(|request| self.dispatch(request, do_soa_check))
        {
            Ok(zone) => CommandReply::ok(format!("transfer of zone {} queued", zone)),
            Err(e) => CommandReply::error(e.to_string()),
        }
    }

    /// Reserve a registry slot and start the transfer task. The
    /// membership and quota checks plus the insert happen under one lock
    /// acquisition, so two racing commands can neither double-transfer a
    /// zone nor overrun the quota.
    fn dispatch(&self, request: TransferRequest, do_soa_check: bool) -> Result<String> {
        let zone_key = zone_key(&request.zone_name);

        let mut state = self.state.lock();
        if state.active.contains_key(&zone_key) {
            return Err(XfrError::AlreadyInProgress(request.zone_name));
        }
        if state.active.len() >= state.transfers_in {
            return Err(XfrError::QuotaExceeded);
        }

        info!(
            "starting {} of zone {} from {}",
            if do_soa_check { "refresh" } else { "retransfer" },
            request.zone_name,
            request.master
        );

        let registry = Arc::clone(&self.state);
        let transport_factory = Arc::clone(&self.transport_factory);
        let sink_factory = Arc::clone(&self.sink_factory);
        let config = self.config.clone();
        let task_key = zone_key.clone();
        let zone_name = request.zone_name.clone();

        let task = tokio::spawn(async move {
            let outcome = match sink_factory.open(&request.zone_name, &request.db_file) {
                Ok(mut sink) => {
                    let mut conn = TransferConnection::new(
                        request.zone_name.clone(),
                        request.rclass,
                        request.master,
                        transport_factory,
                        &config,
                    );
                    conn.run(do_soa_check, sink.as_mut()).await
                }
                Err(e) => {
                    warn!("zone {}: cannot open zone store: {}", request.zone_name, e);
                    TransferOutcome::Fail
                }
            };
            if outcome == TransferOutcome::Fail {
                debug!("zone {}: transfer task finished with failure", request.zone_name);
            }
            // the registry entry goes away on every outcome
            registry.lock().active.remove(&task_key);
        });

        state.active.insert(zone_key, task);
        Ok(zone_name)
    }

    /// Apply a runtime configuration update. An absent `transfers_in`
    /// key leaves the current quota untouched.
    pub fn on_config_update(&self, update: &CommandArgs) -> Result<()> {
        if let Some(quota) = XfrConfig::transfers_in_update(update)? {
            self.state.lock().transfers_in = quota;
        }
        Ok(())
    }

    /// Number of transfers currently in flight.
    pub fn active_transfers(&self) -> usize {
        self.state.lock().active.len()
    }

    /// Whether the given zone has a transfer in flight.
    pub fn is_transferring(&self, zone_name: &str) -> bool {
        self.state.lock().active.contains_key(&zone_key(zone_name))
    }
}

/// Registry key: zone names compare case-insensitively and with or
/// without the trailing root dot.
fn zone_key(zone_name: &str) -> String {
    zone_name.trim_end_matches('.').to_lowercase()
}

fn parse_port(value: &Value) -> Result<u16> {
    let port = match value {
        Value::Number(n) => n.as_u64().and_then(|p| u16::try_from(p).ok()),
        Value::String(s) => s.parse::<u16>().ok(),
        _ => None,
    };
    port.ok_or_else(|| XfrError::BadParameters(format!("invalid port: {}", value)))
}
