mod execution_channel;
mod peer_session;
mod peer_task;
mod session_context;

pub use execution_channel::*;
pub use peer_session::*;
pub use session_context::*;
