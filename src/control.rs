//! Control-channel surface of the transfer manager.
//!
//! The real command bus lives outside this crate; it is consumed here
//! through a narrow interface: commands and configuration updates arrive
//! as [`ControlMessage`]s on an mpsc channel, command replies go back
//! over a oneshot. A `shutdown` command stops the loop; transfers already
//! in flight run to natural completion.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use crate::transfer::manager::{CommandArgs, TransferManager};

/// Result tuple of one command: 0 = success, 1 = error, plus a message.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct CommandReply {
    pub code: i32,
    pub message: String,
}

impl CommandReply {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            code: 0,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            code: 1,
            message: message.into(),
        }
    }
}

#[derive(Debug)]
pub enum ControlMessage {
    Command {
        name: String,
        args: Option<CommandArgs>,
        reply: oneshot::Sender<CommandReply>,
    },
    ConfigUpdate(CommandArgs),
}

/// Drive the manager from the control channel until shutdown.
pub async fn run_control_loop(
    manager: Arc<TransferManager>,
    mut rx: mpsc::Receiver<ControlMessage>,
) {
    while let Some(message) = rx.recv().await {
        match message {
            ControlMessage::Command { name, args, reply } => {
                let result = manager.handle_command(&name, args.as_ref());
                let _ = reply.send(result);
                if name == "shutdown" {
                    info!(
                        "control loop stopping, {} transfers still in flight",
                        manager.active_transfers()
                    );
                    break;
                }
            }
            ControlMessage::ConfigUpdate(update) => {
                if let Err(e) = manager.on_config_update(&update) {
                    warn!("rejected config update: {}", e);
                }
            }
        }
    }
}

/// Send one command and wait for its reply. Helper for control shims.
pub async fn send_command(
    tx: &mpsc::Sender<ControlMessage>,
    name: impl Into<String>,
    args: Option<CommandArgs>,
) -> Option<CommandReply> {
    let (reply_tx, reply_rx) = oneshot::channel();
    tx.send(ControlMessage::Command {
        name: name.into(),
        args,
        reply: reply_tx,
    })
    .await
    .ok()?;
    reply_rx.await.ok()
}
