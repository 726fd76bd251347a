mod broker;
mod config;
mod error;
mod metrics;
mod registry;
mod server;
mod signaling;

pub use broker::*;
pub use config::*;
pub use error::*;
pub use metrics::*;
pub use registry::*;
pub use server::*;
pub use signaling::*;
