
use tracing::Level;

use vt_broker::{Broker, BrokerConfig, BrokerHandle};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn create_test_broker() -> BrokerHandle {
    let (handle, _task) = Broker::spawn(&BrokerConfig::default());
    handle
}
