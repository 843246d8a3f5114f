//! Daemon entry point.
//!
//! The production command bus is an external collaborator; this binary
//! stands in for it with a JSON-lines shim on stdin. Each line is either
//! `{"command": "...", "args": {...}}` or `{"config": {...}}`; command
//! replies are printed to stdout as JSON.

use std::sync::Arc;

use clap::Parser;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use muninn::config::XfrConfig;
use muninn::control::{ControlMessage, run_control_loop, send_command};
use muninn::transfer::manager::TransferManager;

#[derive(Parser, Debug)]
#[command(name = "muninn", about = "Inbound DNS zone transfer (AXFR) daemon")]
struct Cli {
    /// Maximum number of concurrent inbound transfers
    #[arg(long)]
    transfers_in: Option<usize>,

    /// Idle timeout in seconds while waiting for transfer data
    #[arg(long)]
    idle_timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = XfrConfig::from_env()?;
    if let Some(transfers_in) = cli.transfers_in {
        config.transfers_in = transfers_in;
    }
    if let Some(secs) = cli.idle_timeout {
        config.idle_timeout = std::time::Duration::from_secs(secs);
    }

    info!(
        "muninn starting, transfers_in={}, idle_timeout={:?}",
        config.transfers_in, config.idle_timeout
    );

    let manager = Arc::new(TransferManager::with_defaults(config));
    let (tx, rx) = mpsc::channel(32);
    let control = tokio::spawn(run_control_loop(manager, rx));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tx.closed() => break,
        };
        let Some(line) = line else {
            // stdin closed; stop accepting commands
            let _ = send_command(&tx, "shutdown", None).await;
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let parsed: Value = match serde_json::from_str(&line) {
            Ok(value) => value,
            Err(e) => {
                warn!("ignoring unparseable control line: {}", e);
                continue;
            }
        };

        if let Some(update) = parsed.get("config").and_then(Value::as_object) {
            if tx
                .send(ControlMessage::ConfigUpdate(update.clone()))
                .await
                .is_err()
            {
                break;
            }
            continue;
        }

        let Some(command) = parsed.get("command").and_then(Value::as_str) else {
            warn!("control line carries neither command nor config");
            continue;
        };
        let args = parsed
            .get("args")
            .and_then(Value::as_object)
            .cloned();

        let shutdown = command == "shutdown";
        match send_command(&tx, command, args).await {
            Some(reply) => println!("{}", serde_json::to_string(&reply)?),
            None => {
                error!("control loop gone, exiting");
                break;
            }
        }
        if shutdown {
            break;
        }
    }

    control.await?;
    info!("muninn stopped");
    Ok(())
}
