use anyhow::{Context, Result};
use async_trait::async_trait;
use colored::*;
use dialoguer::Select;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::{debug, error, warn};
use vt_core::{ConnectionId, ExecFrame, ExecFrameType};
use vt_peer::{
    ExecutionChannel, PeerConfig, PeerSession, RelayConnection, SessionContext,
    WebRtcTransportFactory,
};

const SUPPORTED_IMAGES: &[&str] = &["ubuntu", "debian", "alpine", "fedora", "archlinux"];

/// Provisions the chosen image on connect and prints results.
struct Terminal {
    image: String,
    ready: watch::Sender<bool>,
}

#[async_trait]
impl ExecutionChannel for Terminal {
    async fn on_established(&self, ctx: &SessionContext, peer: ConnectionId) {
        println!("{}", format!("🔗 Connected to donor {peer}").green().bold());

        let frame = ExecFrame::create_container(self.image.as_str());
        match serde_json::to_string(&frame) {
            Ok(json) => {
                if let Err(e) = ctx.send_to(&peer, &json).await {
                    error!(%peer, error = %e, "Failed to request container");
                    return;
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to encode frame");
                return;
            }
        }

        let _ = self.ready.send(true);
    }

    async fn on_message(&self, _ctx: &SessionContext, peer: ConnectionId, payload: String) {
        match serde_json::from_str::<ExecFrame>(&payload) {
            Ok(frame) if frame.frame_type == ExecFrameType::Rslt => {
                print!("{}", frame.data);
                let _ = std::io::stdout().flush();
            }
            Ok(frame) => debug!(%peer, frame_type = ?frame.frame_type, "Ignoring frame"),
            Err(e) => warn!(%peer, error = %e, "Unframed payload received"),
        }
    }

    async fn on_closed(&self, _ctx: &SessionContext, peer: ConnectionId) {
        let _ = self.ready.send(false);
        println!("{}", format!("Donor {peer} disconnected").yellow());
    }
}

pub async fn run(config: PeerConfig, server: &str, image: Option<String>) -> Result<()> {
    let image = match image {
        Some(image) => image,
        None => pick_image()?,
    };
    println!(
        "{}",
        format!("📦 Preparing to provision: {image}").green().bold()
    );

    let relay = RelayConnection::connect(server)
        .await
        .context("Could not reach the signaling server")?;

    let (ready_tx, ready_rx) = watch::channel(false);
    let terminal = Arc::new(Terminal {
        image,
        ready: ready_tx,
    });

    let session = PeerSession::donee(
        config,
        Arc::new(WebRtcTransportFactory::new()),
        terminal,
        relay,
    );
    let input = tokio::spawn(forward_stdin(session.context(), ready_rx));

    let result = session.run().await.context("Donee session ended");
    input.abort();
    result
}

fn pick_image() -> Result<String> {
    let index = Select::new()
        .with_prompt("Choose an OS to run remotely")
        .items(SUPPORTED_IMAGES)
        .default(0)
        .interact()
        .context("Prompt couldn't be rendered in the current environment")?;

    Ok(SUPPORTED_IMAGES[index].to_string())
}

/// Sends each stdin line as a `CMD` frame once a donor is connected.
async fn forward_stdin(ctx: SessionContext, mut ready: watch::Receiver<bool>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        ready.wait_for(|connected| *connected).await?;

        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };

        let frame = serde_json::to_string(&ExecFrame::cmd(format!("{line}\n")))?;
        if let Err(e) = ctx.send(&frame).await {
            println!("{}", format!("Command not sent: {e}").red());
        }
    }
}
