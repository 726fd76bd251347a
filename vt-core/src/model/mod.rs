mod connection;
mod exec;
mod ice;
mod report;
mod room;
mod signal;

pub use connection::ConnectionId;
pub use exec::{ExecFrame, ExecFrameType};
pub use ice::{DEFAULT_STUN_ADDR, IceCandidate, IceServerConfig, SdpType, SessionDescription};
pub use report::{ResourceReport, RoomSummary};
pub use room::RoomName;
pub use signal::{ClientSignal, ServerSignal};
