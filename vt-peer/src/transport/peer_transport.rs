use crate::error::PeerError;
use crate::transport::TransportEvent;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use vt_core::{ConnectionId, IceCandidate, IceServerConfig, SessionDescription};

/// One peer connection plus its data channel, as the negotiation engine sees it.
#[async_trait]
pub trait PeerTransport: Send + Sync + 'static {
    async fn create_offer(&self) -> Result<SessionDescription, PeerError>;

    async fn create_answer(&self) -> Result<SessionDescription, PeerError>;

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), PeerError>;

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), PeerError>;

    /// Current local description, including every candidate gathered so far.
    async fn local_description(&self) -> Option<SessionDescription>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), PeerError>;

    /// Creates the data channel on the offering side. The answering side
    /// receives it from the remote and reports [`TransportEvent::ChannelOpen`].
    async fn open_data_channel(&self, label: &str) -> Result<(), PeerError>;

    async fn send(&self, payload: &str) -> Result<(), PeerError>;

    async fn close(&self) -> Result<(), PeerError>;
}

#[async_trait]
pub trait TransportFactory: Send + Sync + 'static {
    async fn create(
        &self,
        peer: ConnectionId,
        ice_servers: Vec<IceServerConfig>,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Arc<dyn PeerTransport>, PeerError>;
}
