mod donee;
mod donor;
mod role_strategy;

pub use donee::*;
pub use donor::*;
pub use role_strategy::*;
