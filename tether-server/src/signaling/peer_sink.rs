use async_trait::async_trait;

use tether_core::{ConnId, ServerMessage};

/// Outbound side of the relay, implemented by the connection gateway so the
/// hub can write to peers without owning any socket state. Sends are
/// best-effort: a closed or slow peer must never stall the caller.
#[async_trait]
pub trait PeerSink: Send + Sync {
    /// Whether the connection is currently registered and writable.
    fn is_open(&self, conn: &ConnId) -> bool;

    /// Send a typed server message.
    async fn send(&self, conn: &ConnId, msg: &ServerMessage);

    /// Forward raw message text verbatim.
    async fn send_raw(&self, conn: &ConnId, raw: &str);
}
