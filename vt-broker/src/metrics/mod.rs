mod metrics_store;
mod routes;

pub use metrics_store::*;
pub use routes::*;
