use crate::broker::{BrokerHandle, Connection};
use crate::server::AppState;
use axum::extract::State;
use axum::extract::WebSocketUpgrade;
use axum::extract::ws::{Message, WebSocket};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tracing::{error, info, warn};
use vt_core::ClientSignal;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.broker))
}

async fn handle_socket(socket: WebSocket, broker: BrokerHandle) {
    let Connection { id, mut signals } = match broker.accept().await {
        Ok(connection) => connection,
        Err(e) => {
            error!("Rejecting relay connection: {}", e);
            return;
        }
    };
    info!("New relay connection: {}", id);

    let (mut sender, mut receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(signal) = signals.recv().await {
            let json = match serde_json::to_string(&signal) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize {}: {}", signal.event_name(), e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let broker = broker.clone();
        let id = id.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<ClientSignal>(&text) {
                        Ok(signal) => {
                            if let Err(e) = broker.dispatch(&id, signal).await {
                                error!("Broker died: {}", e);
                                break;
                            }
                        }
                        Err(e) => warn!("Invalid envelope from {}: {}", id, e),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    let _ = broker.disconnect(&id).await;
    info!("Relay connection closed: {}", id);
}
