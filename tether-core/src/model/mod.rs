mod command;
mod conn;
mod message;
mod status;

pub use command::{COMMAND_LOG_CAPACITY, CommandLog, CommandRecord, CommandSource, now_ms};
pub use conn::{ConnId, Role};
pub use message::{ClientMessage, ServerMessage};
pub use status::{RobotStatus, StatusPatch};
