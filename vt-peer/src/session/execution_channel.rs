use crate::PeerError;
use crate::session::SessionContext;
use async_trait::async_trait;
use vt_core::ConnectionId;

/// Consumer of an established data channel.
///
/// Callbacks run on the session loop, one at a time.
#[async_trait]
pub trait ExecutionChannel: Send + Sync + 'static {
    /// The data channel to `peer` is open; `ctx.send` now reaches it.
    async fn on_established(&self, ctx: &SessionContext, peer: ConnectionId);

    async fn on_message(&self, ctx: &SessionContext, peer: ConnectionId, payload: String);

    async fn on_closed(&self, _ctx: &SessionContext, _peer: ConnectionId) {}

    /// A negotiation step for `peer` failed and its record is already gone.
    async fn on_failed(&self, _ctx: &SessionContext, _peer: ConnectionId, _error: &PeerError) {}
}
