mod http;
mod relay;
mod signaling;

pub use http::*;
pub use relay::*;
pub use signaling::*;
