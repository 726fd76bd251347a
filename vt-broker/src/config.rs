use std::net::SocketAddr;

/// Broker process configuration.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    pub addr: SocketAddr,
    /// Capacity of the broker's command inbox.
    pub command_buffer: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            command_buffer: 256,
        }
    }
}
