use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::command::{CommandRecord, CommandSource};
use crate::model::status::{RobotStatus, StatusPatch};

/// Messages arriving over a signaling connection, dispatched on the `type`
/// tag. Relayed variants carry no payload here: the hub forwards the raw
/// inbound text verbatim, so fields this schema does not model survive the
/// hop untouched.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Viewer,
    Streamer,
    Offer,
    Answer,
    Candidate,
    RobotCommand {
        command: String,
        #[serde(default)]
        params: Value,
        #[serde(default)]
        timestamp: Option<i64>,
        #[serde(default, rename = "commandId")]
        command_id: Option<Value>,
    },
    RobotResponse,
    RobotStatusUpdate {
        status: StatusPatch,
    },
    Ping,
    GetRobotStatus,
    GetCommandHistory,
    #[serde(other)]
    Unknown,
}

/// Messages the relay originates toward a connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    RobotStatus {
        status: RobotStatus,
    },
    #[serde(rename = "viewer-ready")]
    ViewerReady,
    #[serde(rename = "streamer-ready")]
    StreamerReady,
    #[serde(rename = "viewer-disconnected")]
    ViewerDisconnected,
    #[serde(rename = "streamer-disconnected")]
    StreamerDisconnected,
    RobotResponse {
        success: bool,
        error: String,
        #[serde(rename = "commandId")]
        command_id: Option<Value>,
    },
    Pong {
        timestamp: i64,
    },
    CommandHistory {
        commands: Vec<CommandRecord>,
    },
    ConnectionEstablished {
        timestamp: i64,
        #[serde(rename = "serverVersion")]
        server_version: String,
    },
    RobotCommand {
        command: String,
        params: Value,
        timestamp: i64,
        source: CommandSource,
    },
}
