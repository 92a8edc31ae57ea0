use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::oneshot;

use tether_core::{CommandRecord, CommandSource, ConnId, InjectError, RobotStatus};

/// Commands feeding the relay hub's event loop.
#[derive(Debug)]
pub enum HubCommand {
    /// Raw message text received from a connection.
    Inbound { conn: ConnId, raw: String },

    /// Transport-level close of a connection.
    Closed { conn: ConnId },

    /// Command injected by the HTTP layer, with no originating connection.
    Inject {
        command: String,
        params: Value,
        source: CommandSource,
        reply: oneshot::Sender<Result<(), InjectError>>,
    },

    Status {
        reply: oneshot::Sender<RobotStatus>,
    },

    /// Most recent `limit` records plus the total currently retained.
    History {
        limit: usize,
        reply: oneshot::Sender<(Vec<CommandRecord>, usize)>,
    },

    Summary {
        reply: oneshot::Sender<ConnectionSummary>,
    },

    /// Per-command counts over records newer than `since_ms`, plus the total
    /// currently retained.
    Stats {
        since_ms: i64,
        reply: oneshot::Sender<(HashMap<String, u64>, usize)>,
    },
}

/// Which role slots are currently occupied.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSummary {
    pub viewer_connected: bool,
    pub streamer_connected: bool,
}
