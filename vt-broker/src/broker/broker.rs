use crate::broker::{BrokerCommand, BrokerHandle};
use crate::config::BrokerConfig;
use crate::registry::RoomRegistry;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use vt_core::{ConnectionId, RoomName, ServerSignal};

/// Room-scoped relay. Owns room membership and the outbound queue of every
/// accepted connection; the only writer of either is [`Broker::run`].
pub struct Broker {
    registry: RoomRegistry,
    connections: HashMap<ConnectionId, mpsc::UnboundedSender<ServerSignal>>,
    command_rx: mpsc::Receiver<BrokerCommand>,
}

impl Broker {
    pub fn new(command_rx: mpsc::Receiver<BrokerCommand>) -> Self {
        Self {
            registry: RoomRegistry::new(),
            connections: HashMap::new(),
            command_rx,
        }
    }

    pub fn spawn(config: &BrokerConfig) -> (BrokerHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::channel(config.command_buffer);
        let broker = Broker::new(command_rx);
        let task = tokio::spawn(broker.run());
        (BrokerHandle::new(command_tx), task)
    }

    pub async fn run(mut self) {
        info!("Broker event loop started");

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd);
        }

        info!("Broker event loop finished");
    }

    fn handle_command(&mut self, cmd: BrokerCommand) {
        match cmd {
            BrokerCommand::Connect {
                connection_id,
                outbound,
            } => {
                debug!("Registered connection {}", connection_id);
                self.connections.insert(connection_id, outbound);
            }

            BrokerCommand::JoinRoom { from, room } => self.join_room(from, room),

            BrokerCommand::SendOffer { from, to, sdp } => {
                self.deliver(&to, ServerSignal::ReceiveOffer { socket_id: from, sdp });
            }

            BrokerCommand::SendAnswer { from, to, sdp } => {
                self.deliver(&to, ServerSignal::ReceiveAnswer { socket_id: from, sdp });
            }

            BrokerCommand::SendIceCandidate {
                from,
                to,
                label,
                candidate,
            } => self.relay_candidate(from, to, label, candidate),

            BrokerCommand::Disconnect { connection_id } => self.disconnect(connection_id),

            BrokerCommand::ListRooms { reply } => {
                let _ = reply.send(self.registry.summaries());
            }
        }
    }

    fn join_room(&mut self, from: ConnectionId, room: RoomName) {
        info!("Connection {} joins room '{}'", from, room);

        let outcome = self.registry.join(room, from.clone());

        if let Some(previous) = outcome.previous {
            self.notify_removed(&from, &previous.remaining);
        }

        if !outcome.rejoined {
            for member in &outcome.existing {
                self.deliver(
                    member,
                    ServerSignal::NewPeerConnected {
                        socket_id: from.clone(),
                    },
                );
            }
        }

        self.deliver(
            &from,
            ServerSignal::GetPeers {
                you: from.clone(),
                connections: outcome.existing,
            },
        );
    }

    fn relay_candidate(
        &mut self,
        from: ConnectionId,
        to: Option<ConnectionId>,
        label: Option<String>,
        candidate: Value,
    ) {
        let targets = match to {
            Some(target) => vec![target],
            None => match self.registry.room_of(&from) {
                Some(room) => self.registry.others(room, &from),
                None => {
                    warn!("Dropping untargeted ICE candidate from {}: not in a room", from);
                    return;
                }
            },
        };

        for target in targets {
            self.deliver(
                &target,
                ServerSignal::ReceiveIceCandidate {
                    label: label.clone(),
                    socket_id: from.clone(),
                    candidate: candidate.clone(),
                },
            );
        }
    }

    fn disconnect(&mut self, connection_id: ConnectionId) {
        self.connections.remove(&connection_id);

        let Some(outcome) = self.registry.leave(&connection_id) else {
            debug!("Connection {} closed outside any room", connection_id);
            return;
        };

        info!("Connection {} left room '{}'", connection_id, outcome.room);
        self.notify_removed(&connection_id, &outcome.remaining);

        if outcome.room_dropped {
            info!("Room '{}' is empty, dropping it", outcome.room);
        }
    }

    fn notify_removed(&self, removed: &ConnectionId, members: &[ConnectionId]) {
        for member in members {
            self.deliver(
                member,
                ServerSignal::RemovePeerConnected {
                    socket_id: removed.clone(),
                },
            );
        }
    }

    fn deliver(&self, to: &ConnectionId, signal: ServerSignal) {
        let Some(outbound) = self.connections.get(to) else {
            warn!(
                "Routing miss: {} for unknown connection {}",
                signal.event_name(),
                to
            );
            return;
        };

        debug!("Routing {} to {}", signal.event_name(), to);
        if outbound.send(signal).is_err() {
            warn!("Connection {} outbound queue closed", to);
        }
    }
}
