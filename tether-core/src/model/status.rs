use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::command::CommandRecord;

/// Authoritative robot state. One instance per process, owned by the relay
/// hub and mutated only through message handling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotStatus {
    pub connected: bool,
    pub streaming: bool,
    pub position: Option<Value>,
    pub battery: Option<f64>,
    pub last_command: Option<CommandRecord>,
    pub command_count: u64,
}

impl RobotStatus {
    /// Merge a partial update. Only fields present in the patch overwrite;
    /// absent fields keep their prior values.
    pub fn apply(&mut self, patch: StatusPatch) {
        if let Some(connected) = patch.connected {
            self.connected = connected;
        }
        if let Some(streaming) = patch.streaming {
            self.streaming = streaming;
        }
        if let Some(position) = patch.position {
            self.position = Some(position);
        }
        if let Some(battery) = patch.battery {
            self.battery = Some(battery);
        }
    }
}

/// Field-wise status update sent by the robot. The schema is closed: keys
/// outside it are dropped at parse time and never reach [`RobotStatus`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusPatch {
    pub connected: Option<bool>,
    pub streaming: Option<bool>,
    pub position: Option<Value>,
    pub battery: Option<f64>,
}
