use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use serde_json::Value;
use tether_core::{
    ClientMessage, CommandLog, CommandRecord, CommandSource, ConnId, InjectError, RobotStatus,
    Role, ServerMessage, StatusPatch, now_ms,
};

use crate::relay::{ConnectionRegistry, ConnectionSummary, HubCommand};
use crate::signaling::PeerSink;

/// How many records `get_command_history` returns over the socket.
const WS_HISTORY_LIMIT: usize = 20;

/// The relay hub: single owner of the role registry, robot status and command
/// history. All mutation is serialized through its mailbox; outbound sends go
/// through the [`PeerSink`] and never block the loop.
pub struct RelayHub {
    registry: ConnectionRegistry,
    status: RobotStatus,
    log: CommandLog,
    command_rx: mpsc::Receiver<HubCommand>,
    sink: Arc<dyn PeerSink>,
}

impl RelayHub {
    pub fn new(command_rx: mpsc::Receiver<HubCommand>, sink: Arc<dyn PeerSink>) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            status: RobotStatus::default(),
            log: CommandLog::new(),
            command_rx,
            sink,
        }
    }

    pub async fn run(mut self) {
        info!("Relay hub started");

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }

        info!("Relay hub stopped");
    }

    async fn handle_command(&mut self, cmd: HubCommand) {
        match cmd {
            HubCommand::Inbound { conn, raw } => self.handle_inbound(conn, raw).await,
            HubCommand::Closed { conn } => self.handle_closed(conn).await,
            HubCommand::Inject {
                command,
                params,
                source,
                reply,
            } => {
                let _ = reply.send(self.handle_inject(command, params, source).await);
            }
            HubCommand::Status { reply } => {
                let _ = reply.send(self.status.clone());
            }
            HubCommand::History { limit, reply } => {
                let _ = reply.send((self.log.recent(limit), self.log.len()));
            }
            HubCommand::Summary { reply } => {
                let _ = reply.send(ConnectionSummary {
                    viewer_connected: self.registry.viewer().is_some(),
                    streamer_connected: self.registry.streamer().is_some(),
                });
            }
            HubCommand::Stats { since_ms, reply } => {
                let _ = reply.send((self.log.stats_since(since_ms), self.log.len()));
            }
        }
    }

    async fn handle_inbound(&mut self, conn: ConnId, raw: String) {
        let msg = match serde_json::from_str::<ClientMessage>(&raw) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("Dropping malformed message from {}: {}", conn, e);
                return;
            }
        };

        match msg {
            ClientMessage::Viewer => self.handle_viewer(conn).await,
            ClientMessage::Streamer => self.handle_streamer(conn).await,
            ClientMessage::Offer => self.handle_offer(raw).await,
            ClientMessage::Answer => self.relay_to_streamer(raw).await,
            ClientMessage::Candidate => self.handle_candidate(conn, raw).await,
            ClientMessage::RobotCommand {
                command,
                params,
                timestamp,
                command_id,
            } => {
                self.handle_robot_command(conn, raw, command, params, timestamp, command_id)
                    .await
            }
            ClientMessage::RobotResponse => self.relay_to_viewer(raw).await,
            ClientMessage::RobotStatusUpdate { status } => self.handle_status_update(status).await,
            ClientMessage::Ping => {
                self.sink
                    .send(&conn, &ServerMessage::Pong { timestamp: now_ms() })
                    .await;
            }
            ClientMessage::GetRobotStatus => {
                self.sink
                    .send(
                        &conn,
                        &ServerMessage::RobotStatus {
                            status: self.status.clone(),
                        },
                    )
                    .await;
            }
            ClientMessage::GetCommandHistory => {
                self.sink
                    .send(
                        &conn,
                        &ServerMessage::CommandHistory {
                            commands: self.log.recent(WS_HISTORY_LIMIT),
                        },
                    )
                    .await;
            }
            ClientMessage::Unknown => {
                debug!("Ignoring message with unknown type from {}", conn);
            }
        }
    }

    async fn handle_viewer(&mut self, conn: ConnId) {
        info!("Viewer registered: {}", conn);
        self.registry.set_viewer(conn.clone());

        self.sink
            .send(
                &conn,
                &ServerMessage::RobotStatus {
                    status: self.status.clone(),
                },
            )
            .await;

        if let Some(streamer) = self.open_streamer() {
            self.sink.send(&streamer, &ServerMessage::ViewerReady).await;
            self.status.connected = true;
        }
    }

    async fn handle_streamer(&mut self, conn: ConnId) {
        info!("Streamer registered: {}", conn);
        self.registry.set_streamer(conn);
        self.status.connected = true;
        self.status.streaming = false;

        if let Some(viewer) = self.open_viewer() {
            self.sink.send(&viewer, &ServerMessage::StreamerReady).await;
        }
    }

    async fn handle_offer(&mut self, raw: String) {
        self.status.streaming = true;

        if let Some(viewer) = self.open_viewer() {
            self.sink.send_raw(&viewer, &raw).await;
        } else {
            warn!("No viewer available to receive offer");
        }
    }

    async fn handle_candidate(&mut self, conn: ConnId, raw: String) {
        match self.registry.role_of(&conn) {
            Some(Role::Viewer) => {
                if let Some(streamer) = self.open_streamer() {
                    self.sink.send_raw(&streamer, &raw).await;
                }
            }
            Some(Role::Streamer) => {
                if let Some(viewer) = self.open_viewer() {
                    self.sink.send_raw(&viewer, &raw).await;
                }
            }
            None => debug!("Dropping candidate from unregistered connection {}", conn),
        }
    }

    async fn handle_robot_command(
        &mut self,
        conn: ConnId,
        raw: String,
        command: String,
        params: Value,
        timestamp: Option<i64>,
        command_id: Option<Value>,
    ) {
        info!("Robot command received: {}", command);

        let record = CommandRecord {
            command,
            params,
            timestamp: timestamp.unwrap_or_else(now_ms),
            source: CommandSource::Viewer,
        };
        self.status.last_command = Some(record.clone());
        self.status.command_count += 1;
        self.log.push(record);

        if let Some(streamer) = self.open_streamer() {
            self.sink.send_raw(&streamer, &raw).await;
        } else {
            warn!("No robot available to receive command");
            self.sink
                .send(
                    &conn,
                    &ServerMessage::RobotResponse {
                        success: false,
                        error: InjectError::RobotNotConnected.to_string(),
                        command_id,
                    },
                )
                .await;
        }
    }

    async fn handle_status_update(&mut self, patch: StatusPatch) {
        self.status.apply(patch);

        if let Some(viewer) = self.open_viewer() {
            self.sink
                .send(
                    &viewer,
                    &ServerMessage::RobotStatus {
                        status: self.status.clone(),
                    },
                )
                .await;
        }
    }

    async fn handle_closed(&mut self, conn: ConnId) {
        if self.registry.viewer() == Some(&conn) {
            self.registry.clear_if_viewer(&conn);
            self.status.connected = false;
            info!("Viewer disconnected: {}", conn);

            if let Some(streamer) = self.open_streamer() {
                self.sink
                    .send(&streamer, &ServerMessage::ViewerDisconnected)
                    .await;
            }
        }

        if self.registry.streamer() == Some(&conn) {
            self.registry.clear_if_streamer(&conn);
            self.status.connected = false;
            self.status.streaming = false;
            info!("Streamer disconnected: {}", conn);

            if let Some(viewer) = self.open_viewer() {
                self.sink
                    .send(&viewer, &ServerMessage::StreamerDisconnected)
                    .await;
            }
        }
    }

    /// The API injection path. Never touches the viewer connection: failure is
    /// reported to the caller, not over a socket.
    async fn handle_inject(
        &mut self,
        command: String,
        params: Value,
        source: CommandSource,
    ) -> Result<(), InjectError> {
        let Some(streamer) = self.open_streamer() else {
            return Err(InjectError::RobotNotConnected);
        };

        let record = CommandRecord {
            command,
            params,
            timestamp: now_ms(),
            source,
        };
        let msg = ServerMessage::RobotCommand {
            command: record.command.clone(),
            params: record.params.clone(),
            timestamp: record.timestamp,
            source: record.source,
        };
        self.log.push(record);

        self.sink.send(&streamer, &msg).await;
        Ok(())
    }

    async fn relay_to_streamer(&mut self, raw: String) {
        if let Some(streamer) = self.open_streamer() {
            self.sink.send_raw(&streamer, &raw).await;
        } else {
            debug!("No open streamer; message dropped");
        }
    }

    async fn relay_to_viewer(&mut self, raw: String) {
        if let Some(viewer) = self.open_viewer() {
            self.sink.send_raw(&viewer, &raw).await;
        } else {
            debug!("No open viewer; message dropped");
        }
    }

    fn open_viewer(&self) -> Option<ConnId> {
        self.registry
            .viewer()
            .filter(|c| self.sink.is_open(c))
            .cloned()
    }

    fn open_streamer(&self) -> Option<ConnId> {
        self.registry
            .streamer()
            .filter(|c| self.sink.is_open(c))
            .cloned()
    }
}
