use anyhow::{Context, Result};
use async_trait::async_trait;
use colored::*;
use std::sync::Arc;
use tracing::{info, warn};
use vt_core::{ConnectionId, ExecFrame};
use vt_peer::{
    ExecutionChannel, PeerConfig, PeerSession, RelayConnection, SessionContext,
    WebRtcTransportFactory,
};

/// Reports frames arriving from donees.
struct FrameLogger;

#[async_trait]
impl ExecutionChannel for FrameLogger {
    async fn on_established(&self, _ctx: &SessionContext, peer: ConnectionId) {
        println!("{}", format!("🔗 Donee {peer} connected").green().bold());
    }

    async fn on_message(&self, _ctx: &SessionContext, peer: ConnectionId, payload: String) {
        match serde_json::from_str::<ExecFrame>(&payload) {
            Ok(frame) => {
                info!(%peer, frame_type = ?frame.frame_type, "Frame received");
                println!("{} {}", format!("[{peer}]").cyan(), frame.data);
            }
            Err(e) => warn!(%peer, error = %e, "Unframed payload received"),
        }
    }

    async fn on_closed(&self, _ctx: &SessionContext, peer: ConnectionId) {
        println!("{}", format!("Donee {peer} disconnected").yellow());
    }
}

pub async fn run(config: PeerConfig, server: &str) -> Result<()> {
    println!(
        "{}",
        format!("📡 Donating in room '{}'", config.room).green().bold()
    );

    let relay = RelayConnection::connect(server)
        .await
        .context("Could not reach the signaling server")?;

    let session = PeerSession::donor(
        config,
        Arc::new(WebRtcTransportFactory::new()),
        Arc::new(FrameLogger),
        relay,
    );

    session.run().await.context("Donor session ended")
}
