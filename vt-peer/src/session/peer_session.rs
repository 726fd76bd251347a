use crate::config::{FailurePolicy, PeerConfig, UnknownPeerPolicy};
use crate::error::PeerError;
use crate::negotiation::{NegotiationEngine, NegotiationState};
use crate::relay::RelayChannel;
use crate::role::{Donee, Donor, OfferAction, PeerJoinedAction, RoleStrategy};
use crate::session::peer_task::{PeerCommand, PeerEvent, PeerTask, PeerTaskConfig};
use crate::session::{ExecutionChannel, SessionContext};
use crate::transport::{PeerTransport, TransportFactory};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use vt_core::{ClientSignal, ConnectionId, IceCandidate, RoomName, ServerSignal, SessionDescription};

struct PeerRecord {
    commands: mpsc::Sender<PeerCommand>,
    transport: Arc<dyn PeerTransport>,
    task: JoinHandle<()>,
    initiator: bool,
}

/// One participant's view of a room: a relay connection plus a record per
/// remote peer it is negotiating with.
///
/// Every remote peer gets its own task, so negotiations with different peers
/// never share state. The session loop itself only routes.
pub struct PeerSession {
    config: PeerConfig,
    role: Arc<dyn RoleStrategy>,
    factory: Arc<dyn TransportFactory>,
    exec: Arc<dyn ExecutionChannel>,
    relay: RelayChannel,
    records: HashMap<ConnectionId, PeerRecord>,
    event_tx: mpsc::UnboundedSender<PeerEvent>,
    event_rx: mpsc::UnboundedReceiver<PeerEvent>,
    ctx: SessionContext,
}

impl PeerSession {
    pub fn new(
        config: PeerConfig,
        role: Arc<dyn RoleStrategy>,
        factory: Arc<dyn TransportFactory>,
        exec: Arc<dyn ExecutionChannel>,
        relay: RelayChannel,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        Self {
            config,
            role,
            factory,
            exec,
            relay,
            records: HashMap::new(),
            event_tx,
            event_rx,
            ctx: SessionContext::new(),
        }
    }

    pub fn donor(
        config: PeerConfig,
        factory: Arc<dyn TransportFactory>,
        exec: Arc<dyn ExecutionChannel>,
        relay: RelayChannel,
    ) -> Self {
        Self::new(config, Arc::new(Donor), factory, exec, relay)
    }

    pub fn donee(
        config: PeerConfig,
        factory: Arc<dyn TransportFactory>,
        exec: Arc<dyn ExecutionChannel>,
        relay: RelayChannel,
    ) -> Self {
        Self::new(config, Arc::new(Donee), factory, exec, relay)
    }

    pub fn context(&self) -> SessionContext {
        self.ctx.clone()
    }

    pub fn join(&self, room: &RoomName) -> Result<(), PeerError> {
        info!(role = %self.role.role(), %room, "Joining room");
        self.send_to_relay(ClientSignal::JoinRoom { room: room.clone() })
    }

    /// Joins the configured room and runs until the relay closes or a fatal
    /// error occurs. All peer records are torn down before returning.
    pub async fn run(mut self) -> Result<(), PeerError> {
        let room = self.config.room.clone();
        if self.role.missing_relay(&self.config) {
            warn!(
                role = %self.role.role(),
                "No TURN relay configured, set VT_TURN_URL so donees behind restrictive NAT can connect"
            );
        }
        self.join(&room)?;

        let result = loop {
            tokio::select! {
                signal = self.relay.inbound.recv() => match signal {
                    Some(s) => {
                        if let Err(e) = self.handle_signal(s).await {
                            break Err(e);
                        }
                    }
                    None => {
                        break Err(PeerError::RelayConnection(
                            "signaling relay closed".to_string(),
                        ));
                    }
                },

                Some(event) = self.event_rx.recv() => {
                    if let Err(e) = self.handle_peer_event(event).await {
                        break Err(e);
                    }
                }
            }
        };

        if let Err(e) = &result {
            error!(role = %self.role.role(), error = %e, "Session ending");
        }
        self.teardown().await;
        result
    }

    async fn handle_signal(&mut self, signal: ServerSignal) -> Result<(), PeerError> {
        debug!(event = signal.event_name(), "Relay signal");

        match signal {
            ServerSignal::GetPeers { you, connections } => {
                info!(local_id = %you, peers = connections.len(), "Joined room");
                self.ctx.set_local_id(you).await;
                for peer in connections {
                    self.on_peer_joined(peer).await;
                }
            }

            ServerSignal::NewPeerConnected { socket_id } => {
                self.on_peer_joined(socket_id).await;
            }

            ServerSignal::RemovePeerConnected { socket_id } => {
                info!(peer = %socket_id, "Peer left room");
                self.discard(&socket_id).await;
            }

            ServerSignal::ReceiveOffer { socket_id, sdp } => {
                if self.role.on_offer_received(&socket_id) == OfferAction::Ignore {
                    warn!(peer = %socket_id, role = %self.role.role(), "Ignoring offer");
                    return Ok(());
                }
                let Some(offer) = parse_payload::<SessionDescription>(&socket_id, sdp) else {
                    return Ok(());
                };
                if !self.records.contains_key(&socket_id) {
                    self.create_record(socket_id.clone(), false).await;
                }
                self.forward(&socket_id, PeerCommand::RemoteOffer(offer)).await?;
            }

            ServerSignal::ReceiveAnswer { socket_id, sdp } => {
                if !self.role.accepts_answers() {
                    warn!(peer = %socket_id, role = %self.role.role(), "Ignoring answer");
                    return Ok(());
                }
                let Some(answer) = parse_payload::<SessionDescription>(&socket_id, sdp) else {
                    return Ok(());
                };
                self.forward(&socket_id, PeerCommand::RemoteAnswer(answer)).await?;
            }

            ServerSignal::ReceiveIceCandidate {
                socket_id,
                candidate,
                ..
            } => {
                let Some(candidate) = parse_payload::<IceCandidate>(&socket_id, candidate) else {
                    return Ok(());
                };
                self.forward(&socket_id, PeerCommand::RemoteCandidate(candidate))
                    .await?;
            }
        }
        Ok(())
    }

    async fn handle_peer_event(&mut self, event: PeerEvent) -> Result<(), PeerError> {
        match event {
            PeerEvent::StateChanged(peer, state) => {
                if self.records.contains_key(&peer) {
                    self.ctx.set_state(peer, state);
                }
            }

            PeerEvent::Established(peer) => {
                let Some(record) = self.records.get(&peer) else {
                    return Ok(());
                };
                info!(%peer, initiator = record.initiator, "Connection established");
                self.ctx.insert_channel(peer.clone(), record.transport.clone());
                self.ctx.set_state(peer.clone(), NegotiationState::Established);
                self.exec.on_established(&self.ctx, peer).await;
            }

            PeerEvent::Message(peer, payload) => {
                self.exec.on_message(&self.ctx, peer, payload).await;
            }

            PeerEvent::Closed(peer) => {
                self.discard(&peer).await;
            }

            PeerEvent::Failed(peer, e) => {
                if !self.records.contains_key(&peer) {
                    debug!(%peer, error = %e, "Failure from a discarded peer");
                    return Ok(());
                }
                error!(%peer, error = %e, "Negotiation step failed");
                self.discard(&peer).await;
                self.exec.on_failed(&self.ctx, peer, &e).await;

                if self.config.negotiation_failure == FailurePolicy::Fail {
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    async fn on_peer_joined(&mut self, peer: ConnectionId) {
        match self.role.on_peer_joined(&peer) {
            PeerJoinedAction::Initiate => {
                if self.records.contains_key(&peer) {
                    debug!(%peer, "Already negotiating with peer");
                    return;
                }
                if self.create_record(peer.clone(), true).await {
                    let _ = self.forward(&peer, PeerCommand::Initiate).await;
                }
            }
            PeerJoinedAction::Ignore => {
                debug!(%peer, role = %self.role.role(), "Peer joined, waiting for its offer");
            }
        }
    }

    async fn create_record(&mut self, peer: ConnectionId, initiator: bool) -> bool {
        let (transport_tx, transport_rx) = mpsc::channel(self.config.peer_buffer);
        let ice_servers = self.role.ice_servers(&self.config);

        let transport = match self
            .factory
            .create(peer.clone(), ice_servers, transport_tx)
            .await
        {
            Ok(transport) => transport,
            Err(e) => {
                error!(%peer, error = %e, "Failed to create transport");
                return false;
            }
        };

        let (command_tx, command_rx) = mpsc::channel(self.config.peer_buffer);
        let task = PeerTask::new(
            NegotiationEngine::new(peer.clone(), transport.clone()),
            command_rx,
            transport_rx,
            self.relay.outbound.clone(),
            self.event_tx.clone(),
            PeerTaskConfig {
                trickle: self.config.trickle,
                label: self.config.room.to_string(),
                channel_label: self.config.channel_label.clone(),
            },
        );

        info!(%peer, initiator, "Creating peer record");
        self.records.insert(
            peer.clone(),
            PeerRecord {
                commands: command_tx,
                transport,
                task: tokio::spawn(task.run()),
                initiator,
            },
        );
        self.ctx.set_state(peer.clone(), NegotiationState::NoSession);
        self.ctx.set_active(peer).await;
        true
    }

    async fn forward(&self, peer: &ConnectionId, cmd: PeerCommand) -> Result<(), PeerError> {
        let Some(record) = self.records.get(peer) else {
            return self.unknown_peer(peer);
        };

        if record.commands.send(cmd).await.is_err() {
            warn!(%peer, "Peer task is gone, dropping command");
        }
        Ok(())
    }

    fn unknown_peer(&self, peer: &ConnectionId) -> Result<(), PeerError> {
        match self.config.unknown_peer {
            UnknownPeerPolicy::Drop => {
                warn!(%peer, "Signal for unknown peer dropped");
                Ok(())
            }
            UnknownPeerPolicy::Fail => Err(PeerError::UnknownPeer(peer.clone())),
        }
    }

    async fn discard(&mut self, peer: &ConnectionId) {
        let Some(record) = self.records.remove(peer) else {
            return;
        };

        record.task.abort();
        let was_established = self.ctx.remove(peer).await;

        if let Err(e) = record.transport.close().await {
            debug!(%peer, error = %e, "Error closing transport");
        }
        info!(%peer, was_established, "Peer record discarded");

        if was_established {
            self.exec.on_closed(&self.ctx, peer.clone()).await;
        }
    }

    async fn teardown(&mut self) {
        let peers: Vec<ConnectionId> = self.records.keys().cloned().collect();
        for peer in peers {
            self.discard(&peer).await;
        }
    }

    fn send_to_relay(&self, signal: ClientSignal) -> Result<(), PeerError> {
        self.relay
            .outbound
            .send(signal)
            .map_err(|_| PeerError::RelayConnection("signaling relay closed".to_string()))
    }
}

fn parse_payload<T: DeserializeOwned>(peer: &ConnectionId, value: Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!(%peer, error = %PeerError::from(e), "Dropping malformed payload");
            None
        }
    }
}
