use crate::error::PeerError;
use crate::negotiation::{NegotiationEngine, NegotiationState};
use crate::transport::TransportEvent;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use vt_core::{ClientSignal, ConnectionId, IceCandidate, SdpType, SessionDescription};

/// Work the session hands to a peer's task.
#[derive(Debug)]
pub(crate) enum PeerCommand {
    Initiate,
    RemoteOffer(SessionDescription),
    RemoteAnswer(SessionDescription),
    RemoteCandidate(IceCandidate),
}

/// What a peer's task reports back to the session loop.
#[derive(Debug)]
pub(crate) enum PeerEvent {
    StateChanged(ConnectionId, NegotiationState),
    Established(ConnectionId),
    Message(ConnectionId, String),
    Closed(ConnectionId),
    Failed(ConnectionId, PeerError),
}

pub(crate) struct PeerTaskConfig {
    pub trickle: bool,
    /// Room name, carried as the candidate `label`.
    pub label: String,
    pub channel_label: String,
}

/// Owns one peer's negotiation engine.
///
/// Commands and transport events are handled strictly one after another, so
/// a candidate never overtakes the description it depends on.
pub(crate) struct PeerTask {
    engine: NegotiationEngine,
    commands: mpsc::Receiver<PeerCommand>,
    transport_events: mpsc::Receiver<TransportEvent>,
    relay: mpsc::UnboundedSender<ClientSignal>,
    events: mpsc::UnboundedSender<PeerEvent>,
    config: PeerTaskConfig,
    /// Non-trickle: a local description exists but has not been relayed.
    sdp_pending: bool,
}

impl PeerTask {
    pub fn new(
        engine: NegotiationEngine,
        commands: mpsc::Receiver<PeerCommand>,
        transport_events: mpsc::Receiver<TransportEvent>,
        relay: mpsc::UnboundedSender<ClientSignal>,
        events: mpsc::UnboundedSender<PeerEvent>,
        config: PeerTaskConfig,
    ) -> Self {
        Self {
            engine,
            commands,
            transport_events,
            relay,
            events,
            config,
            sdp_pending: false,
        }
    }

    pub async fn run(mut self) {
        let peer = self.engine.peer().clone();
        debug!(%peer, "Peer task started");

        loop {
            let before = self.engine.state();

            let keep_running = tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(c) => {
                        if let Err(e) = self.handle_command(c).await {
                            let _ = self.events.send(PeerEvent::Failed(peer.clone(), e));
                        }
                        true
                    }
                    None => false,
                },

                evt = self.transport_events.recv() => match evt {
                    Some(e) => self.handle_transport_event(e).await,
                    None => false,
                },
            };

            let after = self.engine.state();
            if after != before {
                let _ = self.events.send(PeerEvent::StateChanged(peer.clone(), after));
            }

            if !keep_running {
                break;
            }
        }

        debug!(%peer, "Peer task finished");
    }

    async fn handle_command(&mut self, cmd: PeerCommand) -> Result<(), PeerError> {
        match cmd {
            PeerCommand::Initiate => {
                self.engine
                    .transport()
                    .open_data_channel(&self.config.channel_label)
                    .await?;
                let offer = self.engine.create_offer().await?;
                self.publish_local_description(offer);
            }

            PeerCommand::RemoteOffer(offer) => {
                let answer = self.engine.apply_remote_offer(offer).await?;
                self.publish_local_description(answer);
            }

            PeerCommand::RemoteAnswer(answer) => {
                self.engine.apply_remote_answer(answer).await?;
            }

            PeerCommand::RemoteCandidate(candidate) => {
                self.engine.enqueue_or_apply_candidate(candidate).await;
            }
        }
        Ok(())
    }

    /// Returns `false` once the transport is gone.
    async fn handle_transport_event(&mut self, event: TransportEvent) -> bool {
        let peer = self.engine.peer().clone();

        match event {
            TransportEvent::LocalCandidate(candidate) => {
                if self.config.trickle {
                    self.relay_candidate(candidate);
                }
            }

            TransportEvent::GatheringComplete => {
                debug!(%peer, "Candidate gathering complete");
                if self.sdp_pending {
                    match self.engine.transport().local_description().await {
                        Some(desc) => {
                            self.sdp_pending = false;
                            self.relay_description(desc);
                        }
                        None => warn!(%peer, "Gathering finished without a local description"),
                    }
                }
            }

            TransportEvent::ChannelOpen => match self.engine.mark_established() {
                Ok(()) => {
                    info!(%peer, "Data channel open");
                    let _ = self.events.send(PeerEvent::Established(peer));
                }
                Err(e) => {
                    let _ = self.events.send(PeerEvent::Failed(peer, e));
                }
            },

            TransportEvent::ChannelMessage(payload) => {
                let _ = self.events.send(PeerEvent::Message(peer, payload));
            }

            TransportEvent::ChannelClosed | TransportEvent::Disconnected => {
                info!(%peer, "Peer transport closed");
                let _ = self.events.send(PeerEvent::Closed(peer));
                return false;
            }
        }
        true
    }

    fn publish_local_description(&mut self, desc: SessionDescription) {
        if self.config.trickle {
            self.relay_description(desc);
        } else {
            // Relayed with the full candidate set on GatheringComplete.
            self.sdp_pending = true;
        }
    }

    fn relay_description(&self, desc: SessionDescription) {
        let socket_id = self.engine.peer().clone();
        let sdp_type = desc.sdp_type;

        let sdp = match serde_json::to_value(desc) {
            Ok(sdp) => sdp,
            Err(e) => {
                warn!(peer = %socket_id, error = %e, "Failed to encode session description");
                return;
            }
        };

        let signal = match sdp_type {
            SdpType::Offer => ClientSignal::SendOffer { socket_id, sdp },
            SdpType::Answer => ClientSignal::SendAnswer { socket_id, sdp },
        };
        self.send_to_relay(signal);
    }

    fn relay_candidate(&self, candidate: IceCandidate) {
        let candidate = match serde_json::to_value(candidate) {
            Ok(candidate) => candidate,
            Err(e) => {
                warn!(error = %e, "Failed to encode local candidate");
                return;
            }
        };

        self.send_to_relay(ClientSignal::SendIceCandidate {
            label: Some(self.config.label.clone()),
            candidate,
            socket_id: Some(self.engine.peer().clone()),
        });
    }

    fn send_to_relay(&self, signal: ClientSignal) {
        if self.relay.send(signal).is_err() {
            debug!(peer = %self.engine.peer(), "Relay closed, dropping outbound signal");
        }
    }
}
