use anyhow::{Result, anyhow};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};

use tether_core::{CommandRecord, CommandSource, RobotStatus};

use crate::relay::{ConnectionSummary, HubCommand};

/// Cloneable facade over the hub mailbox, handed to the HTTP layer.
#[derive(Clone)]
pub struct HubHandle {
    tx: mpsc::Sender<HubCommand>,
}

impl HubHandle {
    pub fn new(tx: mpsc::Sender<HubCommand>) -> Self {
        Self { tx }
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> HubCommand) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| anyhow!("relay hub is not running"))?;
        rx.await.map_err(|_| anyhow!("relay hub dropped the reply"))
    }

    pub async fn status(&self) -> Result<RobotStatus> {
        self.request(|reply| HubCommand::Status { reply }).await
    }

    /// Most recent `limit` records plus the total currently retained.
    pub async fn history(&self, limit: usize) -> Result<(Vec<CommandRecord>, usize)> {
        self.request(|reply| HubCommand::History { limit, reply })
            .await
    }

    /// The most recent `n` records, for the health summary.
    pub async fn recent(&self, n: usize) -> Result<Vec<CommandRecord>> {
        Ok(self.history(n).await?.0)
    }

    pub async fn summary(&self) -> Result<ConnectionSummary> {
        self.request(|reply| HubCommand::Summary { reply }).await
    }

    pub async fn stats(&self, since_ms: i64) -> Result<(HashMap<String, u64>, usize)> {
        self.request(|reply| HubCommand::Stats { since_ms, reply })
            .await
    }

    /// Inject a command without an originating connection. Fails with
    /// [`tether_core::InjectError::RobotNotConnected`] (downcastable from the
    /// returned error) when no open streamer is registered.
    pub async fn inject(
        &self,
        command: String,
        params: Value,
        source: CommandSource,
    ) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(HubCommand::Inject {
                command,
                params,
                source,
                reply,
            })
            .await
            .map_err(|_| anyhow!("relay hub is not running"))?;
        rx.await
            .map_err(|_| anyhow!("relay hub dropped the reply"))??;
        Ok(())
    }
}
