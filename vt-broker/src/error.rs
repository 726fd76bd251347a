use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("broker event loop is no longer running")]
    BrokerClosed,
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("http server failed: {0}")]
    Serve(#[source] std::io::Error),
}
