use std::sync::Arc;
use tokio::sync::mpsc;

use tether_core::ConnId;
use tether_server::{HubCommand, HubHandle, RelayHub};

use super::mock_sink::MockPeerSink;

/// Spawn a relay hub wired to a mock sink.
pub fn spawn_hub() -> (HubHandle, mpsc::Sender<HubCommand>, MockPeerSink) {
    let sink = MockPeerSink::new();
    let (tx, rx) = mpsc::channel(100);
    let hub = RelayHub::new(rx, Arc::new(sink.clone()));

    tokio::spawn(hub.run());

    (HubHandle::new(tx.clone()), tx, sink)
}

/// Deliver one raw message to the hub as if `conn` had sent it.
pub async fn deliver(tx: &mpsc::Sender<HubCommand>, conn: &ConnId, raw: &str) {
    tx.send(HubCommand::Inbound {
        conn: conn.clone(),
        raw: raw.to_owned(),
    })
    .await
    .expect("hub should be running");
}

/// Signal a transport close for `conn`.
pub async fn close(tx: &mpsc::Sender<HubCommand>, conn: &ConnId) {
    tx.send(HubCommand::Closed { conn: conn.clone() })
        .await
        .expect("hub should be running");
}

/// Wait until the hub has processed everything queued before this call. The
/// mailbox is drained in order, so one completed query is a barrier.
pub async fn settle(handle: &HubHandle) {
    handle.status().await.expect("hub should be running");
}

/// Open a connection in the sink and announce it as the viewer.
pub async fn connect_viewer(tx: &mpsc::Sender<HubCommand>, sink: &MockPeerSink) -> ConnId {
    let conn = ConnId::new();
    sink.connect(&conn);
    deliver(tx, &conn, r#"{"type":"viewer"}"#).await;
    conn
}

/// Open a connection in the sink and announce it as the streamer.
pub async fn connect_streamer(tx: &mpsc::Sender<HubCommand>, sink: &MockPeerSink) -> ConnId {
    let conn = ConnId::new();
    sink.connect(&conn);
    deliver(tx, &conn, r#"{"type":"streamer"}"#).await;
    conn
}
