use tokio::sync::mpsc;
use vt_core::{ClientSignal, ServerSignal};

/// The session's side of a signaling relay.
///
/// The relay is considered closed once `inbound` yields `None`.
#[derive(Debug)]
pub struct RelayChannel {
    pub outbound: mpsc::UnboundedSender<ClientSignal>,
    pub inbound: mpsc::UnboundedReceiver<ServerSignal>,
}

/// The far side of an in-memory [`RelayChannel`].
#[derive(Debug)]
pub struct RelayEndpoint {
    pub from_session: mpsc::UnboundedReceiver<ClientSignal>,
    pub to_session: mpsc::UnboundedSender<ServerSignal>,
}

impl RelayChannel {
    pub fn pair() -> (RelayChannel, RelayEndpoint) {
        let (client_tx, client_rx) = mpsc::unbounded_channel();
        let (server_tx, server_rx) = mpsc::unbounded_channel();

        (
            RelayChannel {
                outbound: client_tx,
                inbound: server_rx,
            },
            RelayEndpoint {
                from_session: client_rx,
                to_session: server_tx,
            },
        )
    }
}
