use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, warn};

use tether_core::{ConnId, ServerMessage};

use crate::relay::HubCommand;
use crate::signaling::PeerSink;

struct GatewayInner {
    peers: DashMap<ConnId, mpsc::UnboundedSender<Message>>,
}

/// Connection gateway: owns the outbound half of every open socket plus the
/// hub mailbox. Writes go into per-connection unbounded channels, so the hub
/// side never blocks on a peer.
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<GatewayInner>,
    pub(crate) hub_tx: mpsc::Sender<HubCommand>,
}

impl Gateway {
    pub fn new(hub_tx: mpsc::Sender<HubCommand>) -> Self {
        Self {
            inner: Arc::new(GatewayInner {
                peers: DashMap::new(),
            }),
            hub_tx,
        }
    }

    pub fn add_peer(&self, conn: ConnId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.peers.insert(conn, tx);
    }

    pub fn remove_peer(&self, conn: &ConnId) {
        self.inner.peers.remove(conn);
    }

    fn push(&self, conn: &ConnId, text: String) {
        if let Some(peer) = self.inner.peers.get(conn) {
            if let Err(e) = peer.send(Message::Text(text.into())) {
                error!("Failed to send WS message to {}: {:?}", conn, e);
            }
        } else {
            warn!("Attempted to send to disconnected connection {}", conn);
        }
    }
}

#[async_trait]
impl PeerSink for Gateway {
    fn is_open(&self, conn: &ConnId) -> bool {
        self.inner
            .peers
            .get(conn)
            .map(|peer| !peer.is_closed())
            .unwrap_or(false)
    }

    async fn send(&self, conn: &ConnId, msg: &ServerMessage) {
        match serde_json::to_string(msg) {
            Ok(json) => self.push(conn, json),
            Err(e) => error!("Failed to serialize server message: {}", e),
        }
    }

    async fn send_raw(&self, conn: &ConnId, raw: &str) {
        self.push(conn, raw.to_owned());
    }
}
