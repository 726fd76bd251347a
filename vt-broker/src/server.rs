use crate::broker::{Broker, BrokerHandle};
use crate::config::BrokerConfig;
use crate::error::BrokerError;
use crate::metrics::{MetricsStore, get_report, hello, list_reports, post_report};
use crate::signaling::ws_handler;
use axum::Router;
use axum::routing::get;
use std::future::Future;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub broker: BrokerHandle,
    pub metrics: MetricsStore,
}

impl AppState {
    pub fn new(broker: BrokerHandle) -> Self {
        Self {
            broker,
            metrics: MetricsStore::new(),
        }
    }
}

/// WebSocket relay on `/`, resource reports under `/metrics`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(ws_handler))
        .route("/hello", get(hello))
        .route("/metrics", get(list_reports).post(post_report))
        .route("/metrics/{room}", get(get_report))
        .with_state(state)
}

/// Binds `config.addr` and serves until Ctrl-C.
pub async fn serve(config: BrokerConfig) -> Result<(), BrokerError> {
    let listener = TcpListener::bind(config.addr)
        .await
        .map_err(|source| BrokerError::Bind {
            addr: config.addr,
            source,
        })?;

    serve_on(listener, config, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Shutdown signal received");
    })
    .await
}

pub async fn serve_on<F>(
    listener: TcpListener,
    config: BrokerConfig,
    shutdown: F,
) -> Result<(), BrokerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (broker, broker_task) = Broker::spawn(&config);
    let app = router(AppState::new(broker));

    if let Ok(addr) = listener.local_addr() {
        info!("Signaling broker listening on ws://{}", addr);
    }

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(BrokerError::Serve);

    broker_task.abort();
    info!("Signaling broker stopped");
    result
}
