use crate::error::PeerError;
use crate::relay::RelayChannel;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};
use vt_core::{ClientSignal, ServerSignal};

/// WebSocket client for the signaling broker.
pub struct RelayConnection;

impl RelayConnection {
    /// Connects to `url` and bridges the socket onto a [`RelayChannel`].
    ///
    /// The channel's inbound side closes when the socket does.
    pub async fn connect(url: &str) -> Result<RelayChannel, PeerError> {
        let (ws, _) = connect_async(url)
            .await
            .map_err(|e| PeerError::RelayConnection(format!("{url}: {e}")))?;
        info!(%url, "Connected to signaling relay");

        let (mut ws_tx, mut ws_rx) = ws.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ClientSignal>();
        let (in_tx, in_rx) = mpsc::unbounded_channel::<ServerSignal>();

        tokio::spawn(async move {
            while let Some(signal) = out_rx.recv().await {
                let json = match serde_json::to_string(&signal) {
                    Ok(json) => json,
                    Err(e) => {
                        warn!(error = %e, "Failed to encode signal");
                        continue;
                    }
                };
                if ws_tx.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
            let _ = ws_tx.close().await;
        });

        tokio::spawn(async move {
            while let Some(msg) = ws_rx.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        match serde_json::from_str::<ServerSignal>(&text) {
                            Ok(signal) => {
                                if in_tx.send(signal).is_err() {
                                    break;
                                }
                            }
                            Err(e) => warn!(error = %e, "Dropping invalid envelope from relay"),
                        }
                    }
                    Ok(Message::Close(_)) => {
                        debug!("Relay sent close frame");
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "Relay socket error");
                        break;
                    }
                }
            }
            info!("Signaling relay closed");
        });

        Ok(RelayChannel {
            outbound: out_tx,
            inbound: in_rx,
        })
    }
}
