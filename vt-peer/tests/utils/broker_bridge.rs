use anyhow::{Context, Result};

use vt_broker::BrokerHandle;
use vt_core::ConnectionId;
use vt_peer::{RelayChannel, RelayEndpoint};

/// Connects a [`RelayChannel`] straight to an in-process broker, skipping
/// the WebSocket hop.
pub async fn bridge(broker: &BrokerHandle) -> Result<(ConnectionId, RelayChannel)> {
    let mut connection = broker.accept().await.context("accept failed")?;
    let (
        relay,
        RelayEndpoint {
            mut from_session,
            to_session,
        },
    ) = RelayChannel::pair();
    let id = connection.id.clone();

    let inbound_broker = broker.clone();
    let from = id.clone();
    tokio::spawn(async move {
        while let Some(signal) = from_session.recv().await {
            if inbound_broker.dispatch(&from, signal).await.is_err() {
                break;
            }
        }
        let _ = inbound_broker.disconnect(&from).await;
    });

    tokio::spawn(async move {
        while let Some(signal) = connection.signals.recv().await {
            if to_session.send(signal).is_err() {
                break;
            }
        }
    });

    Ok((id, relay))
}
