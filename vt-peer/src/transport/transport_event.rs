use vt_core::IceCandidate;

/// Events a transport pushes into the task that owns its peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    LocalCandidate(IceCandidate),
    /// Local candidate gathering finished; the local description is final.
    GatheringComplete,
    ChannelOpen,
    ChannelMessage(String),
    ChannelClosed,
    Disconnected,
}
