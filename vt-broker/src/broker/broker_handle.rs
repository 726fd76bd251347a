use crate::broker::BrokerCommand;
use crate::error::BrokerError;
use tokio::sync::{mpsc, oneshot};
use vt_core::{ClientSignal, ConnectionId, RoomSummary, ServerSignal};

/// One accepted relay connection: its broker-assigned id and the stream of
/// envelopes the broker routes to it.
#[derive(Debug)]
pub struct Connection {
    pub id: ConnectionId,
    pub signals: mpsc::UnboundedReceiver<ServerSignal>,
}

/// Cloneable front door to the broker event loop.
#[derive(Clone, Debug)]
pub struct BrokerHandle {
    command_tx: mpsc::Sender<BrokerCommand>,
}

impl BrokerHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<BrokerCommand>) -> Self {
        Self { command_tx }
    }

    /// Registers a new connection. No room event fires until it joins.
    pub async fn accept(&self) -> Result<Connection, BrokerError> {
        let id = ConnectionId::new();
        let (outbound, signals) = mpsc::unbounded_channel();

        self.send(BrokerCommand::Connect {
            connection_id: id.clone(),
            outbound,
        })
        .await?;

        Ok(Connection { id, signals })
    }

    pub async fn dispatch(&self, from: &ConnectionId, signal: ClientSignal) -> Result<(), BrokerError> {
        self.send(BrokerCommand::from_signal(from.clone(), signal))
            .await
    }

    pub async fn disconnect(&self, connection_id: &ConnectionId) -> Result<(), BrokerError> {
        self.send(BrokerCommand::Disconnect {
            connection_id: connection_id.clone(),
        })
        .await
    }

    pub async fn list_rooms(&self) -> Result<Vec<RoomSummary>, BrokerError> {
        let (reply, rx) = oneshot::channel();
        self.send(BrokerCommand::ListRooms { reply }).await?;
        rx.await.map_err(|_| BrokerError::BrokerClosed)
    }

    async fn send(&self, cmd: BrokerCommand) -> Result<(), BrokerError> {
        self.command_tx
            .send(cmd)
            .await
            .map_err(|_| BrokerError::BrokerClosed)
    }
}
