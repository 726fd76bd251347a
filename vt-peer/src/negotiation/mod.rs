mod candidate_queue;
mod negotiation_engine;
mod negotiation_state;

pub use candidate_queue::*;
pub use negotiation_engine::*;
pub use negotiation_state::*;
