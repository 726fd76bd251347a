mod config;
mod error;
mod negotiation;
mod relay;
mod role;
mod session;
mod transport;

pub use config::*;
pub use error::*;
pub use negotiation::*;
pub use relay::*;
pub use role::*;
pub use session::*;
pub use transport::*;
