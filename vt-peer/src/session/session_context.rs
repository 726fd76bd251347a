use crate::error::PeerError;
use crate::negotiation::NegotiationState;
use crate::transport::PeerTransport;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::error;
use vt_core::ConnectionId;

/// Handle onto a running session's peers. Cheap to clone and safe to move
/// across tasks.
#[derive(Clone, Default)]
pub struct SessionContext {
    inner: Arc<ContextInner>,
}

#[derive(Default)]
struct ContextInner {
    channels: DashMap<ConnectionId, Arc<dyn PeerTransport>>,
    states: DashMap<ConnectionId, NegotiationState>,
    active: RwLock<Option<ConnectionId>>,
    local_id: RwLock<Option<ConnectionId>>,
}

impl SessionContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Sends to the active peer.
    pub async fn send(&self, payload: &str) -> Result<(), PeerError> {
        let active = self.active_peer().await;
        match active {
            Some(peer) => self.send_to(&peer, payload).await,
            None => Err(PeerError::DataChannelNotReady { peer: None }),
        }
    }

    pub async fn send_to(&self, peer: &ConnectionId, payload: &str) -> Result<(), PeerError> {
        // Clone out so the map guard is not held across the send.
        let transport = self
            .inner
            .channels
            .get(peer)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| PeerError::DataChannelNotReady {
                peer: Some(peer.clone()),
            })?;

        transport.send(payload).await
    }

    /// Sends to every established peer, logging individual failures.
    pub async fn broadcast(&self, payload: &str) {
        let targets: Vec<(ConnectionId, Arc<dyn PeerTransport>)> = self
            .inner
            .channels
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        for (peer, transport) in targets {
            if let Err(e) = transport.send(payload).await {
                error!(%peer, error = %e, "Broadcast send failed");
            }
        }
    }

    pub fn established_peers(&self) -> Vec<ConnectionId> {
        let mut peers: Vec<ConnectionId> = self
            .inner
            .channels
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        peers.sort();
        peers
    }

    pub fn is_established(&self, peer: &ConnectionId) -> bool {
        self.inner.channels.contains_key(peer)
    }

    pub fn negotiation_state(&self, peer: &ConnectionId) -> Option<NegotiationState> {
        self.inner.states.get(peer).map(|entry| *entry.value())
    }

    /// The peer `send` targets: the most recently created record.
    pub async fn active_peer(&self) -> Option<ConnectionId> {
        self.inner.active.read().await.clone()
    }

    /// Identity the broker assigned this session, known after `get_peers`.
    pub async fn local_id(&self) -> Option<ConnectionId> {
        self.inner.local_id.read().await.clone()
    }

    pub(crate) async fn set_local_id(&self, id: ConnectionId) {
        *self.inner.local_id.write().await = Some(id);
    }

    pub(crate) async fn set_active(&self, peer: ConnectionId) {
        *self.inner.active.write().await = Some(peer);
    }

    pub(crate) fn set_state(&self, peer: ConnectionId, state: NegotiationState) {
        self.inner.states.insert(peer, state);
    }

    pub(crate) fn insert_channel(&self, peer: ConnectionId, transport: Arc<dyn PeerTransport>) {
        self.inner.channels.insert(peer, transport);
    }

    /// Forgets `peer`, returning whether its channel had been established.
    pub(crate) async fn remove(&self, peer: &ConnectionId) -> bool {
        self.inner.states.remove(peer);
        let was_established = self.inner.channels.remove(peer).is_some();

        let mut active = self.inner.active.write().await;
        if active.as_ref() == Some(peer) {
            *active = None;
        }

        was_established
    }
}
