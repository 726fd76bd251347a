use anyhow::{Context, Result};
use std::time::Duration;
use tokio::sync::mpsc;

use vt_broker::BrokerHandle;
use vt_core::{ClientSignal, ConnectionId, RoomName, ServerSignal};

/// Timeout for a single routed envelope (ms).
pub const SIGNAL_TIMEOUT_MS: u64 = 2000;

/// Window in which no further envelope is expected (ms).
pub const SILENCE_MS: u64 = 200;

/// A relay connection driven directly through the broker handle.
pub struct TestConnection {
    pub id: ConnectionId,
    signals: mpsc::UnboundedReceiver<ServerSignal>,
    broker: BrokerHandle,
}

impl TestConnection {
    pub async fn accept(broker: &BrokerHandle) -> Result<Self> {
        let connection = broker.accept().await.context("accept failed")?;
        Ok(Self {
            id: connection.id,
            signals: connection.signals,
            broker: broker.clone(),
        })
    }

    pub async fn send(&self, signal: ClientSignal) -> Result<()> {
        self.broker
            .dispatch(&self.id, signal)
            .await
            .context("dispatch failed")
    }

    pub async fn join(&self, room: &str) -> Result<()> {
        self.send(ClientSignal::JoinRoom {
            room: RoomName::from(room),
        })
        .await
    }

    /// Joins `room` and consumes the `get_peers` reply.
    pub async fn join_and_list(&mut self, room: &str) -> Result<Vec<ConnectionId>> {
        self.join(room).await?;
        match self.recv().await? {
            ServerSignal::GetPeers { you, connections } => {
                anyhow::ensure!(you == self.id, "get_peers addressed to {you}");
                Ok(connections)
            }
            other => anyhow::bail!("expected get_peers, got {other:?}"),
        }
    }

    pub async fn recv(&mut self) -> Result<ServerSignal> {
        tokio::time::timeout(
            Duration::from_millis(SIGNAL_TIMEOUT_MS),
            self.signals.recv(),
        )
        .await
        .context("timeout waiting for envelope")?
        .context("signal channel closed")
    }

    pub async fn expect_silence(&mut self) -> Result<()> {
        match tokio::time::timeout(Duration::from_millis(SILENCE_MS), self.signals.recv()).await {
            Err(_) => Ok(()),
            Ok(None) => Ok(()),
            Ok(Some(signal)) => anyhow::bail!("unexpected envelope {signal:?}"),
        }
    }

    pub async fn disconnect(&self) -> Result<()> {
        self.broker
            .disconnect(&self.id)
            .await
            .context("disconnect failed")
    }
}
