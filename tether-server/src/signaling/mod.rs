mod gateway;
mod peer_sink;
mod ws_handler;

pub use gateway::*;
pub use peer_sink::*;
pub use ws_handler::*;
