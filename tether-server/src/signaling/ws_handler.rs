use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{error, info};

use tether_core::{ConnId, ServerMessage, now_ms};

use crate::http::AppState;
use crate::relay::HubCommand;
use crate::signaling::{Gateway, PeerSink};

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.gateway))
}

async fn handle_socket(socket: WebSocket, gateway: Gateway) {
    let conn = ConnId::new();
    info!("New WebSocket connection: {}", conn);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    gateway.add_peer(conn.clone(), tx);

    gateway
        .send(
            &conn,
            &ServerMessage::ConnectionEstablished {
                timestamp: now_ms(),
                server_version: SERVER_VERSION.to_owned(),
            },
        )
        .await;

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let gateway = gateway.clone();
        let conn = conn.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => {
                        let cmd = HubCommand::Inbound {
                            conn: conn.clone(),
                            raw: text.to_string(),
                        };
                        if gateway.hub_tx.send(cmd).await.is_err() {
                            error!("Relay hub gone; closing connection {}", conn);
                            break;
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    gateway.remove_peer(&conn);
    let _ = gateway
        .hub_tx
        .send(HubCommand::Closed { conn: conn.clone() })
        .await;

    info!("WebSocket disconnected: {}", conn);
}
