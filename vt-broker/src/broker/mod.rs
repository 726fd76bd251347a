mod broker;
mod broker_command;
mod broker_handle;

pub use broker::*;
pub use broker_command::*;
pub use broker_handle::*;
