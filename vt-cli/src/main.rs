mod donee;
mod donor;
mod list;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::*;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;
use vt_broker::BrokerConfig;
use vt_peer::PeerConfig;

const DEFAULT_SERVER: &str = "ws://127.0.0.1:8080";

#[derive(Parser)]
#[command(name = "vt")]
#[command(about = "Share and borrow compute over direct peer connections")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling broker.
    Broker {
        #[arg(long, default_value = "0.0.0.0:8080")]
        addr: SocketAddr,
    },
    /// Offer this machine's compute in a room.
    ///
    /// Without VT_TURN_URL (plus VT_TURN_USERNAME and VT_TURN_CREDENTIAL) the
    /// donor offers STUN only, and donees behind restrictive NAT cannot connect.
    #[command(after_help = "Environment: VT_TURN_URL, VT_TURN_USERNAME, VT_TURN_CREDENTIAL, TRICKLE")]
    Donor(SessionArgs),
    /// Connect to a donor and run commands on it.
    Donee {
        #[command(flatten)]
        session: SessionArgs,

        /// Image to provision; prompts when omitted.
        #[arg(long)]
        image: Option<String>,
    },
    /// List rooms and donor reports known to a broker.
    List {
        #[arg(long, default_value = "http://127.0.0.1:8080")]
        api: String,
    },
}

#[derive(Args)]
struct SessionArgs {
    #[arg(long)]
    room: String,

    #[arg(long, default_value = DEFAULT_SERVER)]
    server: String,

    /// Relay the session description once, after gathering completes.
    #[arg(long)]
    no_trickle: bool,
}

impl SessionArgs {
    fn peer_config(&self) -> PeerConfig {
        let mut config = PeerConfig::from_env(self.room.as_str());
        if self.no_trickle {
            config.trickle = false;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Commands::Broker { addr } => {
            println!("{}", format!("🚀 Starting broker on {addr}").green().bold());
            let config = BrokerConfig {
                addr,
                ..Default::default()
            };
            vt_broker::serve(config).await?;
        }
        Commands::Donor(session) => {
            donor::run(session.peer_config(), &session.server).await?;
        }
        Commands::Donee { session, image } => {
            donee::run(session.peer_config(), &session.server, image).await?;
        }
        Commands::List { api } => {
            list::run(&api).await?;
        }
    }

    Ok(())
}
