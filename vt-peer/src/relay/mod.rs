mod relay_channel;
mod relay_connection;

pub use relay_channel::*;
pub use relay_connection::*;
