use crate::error::PeerError;
use crate::negotiation::{CandidateQueue, NegotiationState};
use crate::transport::PeerTransport;
use std::sync::Arc;
use tracing::{debug, warn};
use vt_core::{ConnectionId, IceCandidate, SessionDescription};

/// Offer/answer state machine for one remote peer.
///
/// Candidates arriving before the remote description is applied are held in a
/// [`CandidateQueue`] and applied, in arrival order, the moment it is.
/// A failed transport step leaves the state where the failure happened;
/// [`NegotiationEngine::reset`] is the way back to `NoSession`.
///
/// Remote candidates are best-effort on both paths: one the transport rejects
/// is logged and skipped, and the ones after it still apply.
pub struct NegotiationEngine {
    peer: ConnectionId,
    transport: Arc<dyn PeerTransport>,
    state: NegotiationState,
    queue: CandidateQueue,
}

impl NegotiationEngine {
    pub fn new(peer: ConnectionId, transport: Arc<dyn PeerTransport>) -> Self {
        Self {
            peer,
            transport,
            state: NegotiationState::NoSession,
            queue: CandidateQueue::new(),
        }
    }

    pub fn peer(&self) -> &ConnectionId {
        &self.peer
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn transport(&self) -> &Arc<dyn PeerTransport> {
        &self.transport
    }

    pub fn queued_candidates(&self) -> usize {
        self.queue.len()
    }

    /// Creates the local offer and sets it as the local description.
    pub async fn create_offer(&mut self) -> Result<SessionDescription, PeerError> {
        self.expect_state("create_offer", NegotiationState::NoSession)?;

        let offer = self.transport.create_offer().await?;
        self.transport.set_local_description(offer.clone()).await?;
        self.transition(NegotiationState::OfferPending);

        Ok(offer)
    }

    pub async fn apply_remote_answer(
        &mut self,
        answer: SessionDescription,
    ) -> Result<(), PeerError> {
        self.expect_state("apply_remote_answer", NegotiationState::OfferPending)?;

        self.transport.set_remote_description(answer).await?;
        self.transition(NegotiationState::RemoteDescriptionSet);
        self.drain_queue().await;

        Ok(())
    }

    /// Applies the remote offer and returns the local answer, already set as
    /// the local description.
    pub async fn apply_remote_offer(
        &mut self,
        offer: SessionDescription,
    ) -> Result<SessionDescription, PeerError> {
        self.expect_state("apply_remote_offer", NegotiationState::NoSession)?;
        self.transition(NegotiationState::AnswerPending);

        self.transport.set_remote_description(offer).await?;
        self.transition(NegotiationState::RemoteDescriptionSet);
        self.drain_queue().await;

        let answer = self.transport.create_answer().await?;
        self.transport.set_local_description(answer.clone()).await?;

        Ok(answer)
    }

    pub async fn enqueue_or_apply_candidate(&mut self, candidate: IceCandidate) {
        if self.state.accepts_candidates() {
            self.apply_candidate(candidate).await;
        } else {
            debug!(peer = %self.peer, state = %self.state, "Queueing remote candidate");
            self.queue.push(candidate);
        }
    }

    pub fn mark_established(&mut self) -> Result<(), PeerError> {
        match self.state {
            NegotiationState::Established => Ok(()),
            NegotiationState::RemoteDescriptionSet => {
                self.transition(NegotiationState::Established);
                Ok(())
            }
            state => Err(PeerError::NegotiationState {
                peer: self.peer.clone(),
                operation: "mark_established",
                state,
            }),
        }
    }

    /// Back to `NoSession`, discarding anything still queued.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.transition(NegotiationState::NoSession);
    }

    async fn drain_queue(&mut self) {
        let pending: Vec<IceCandidate> = self.queue.drain().collect();
        for candidate in pending {
            self.apply_candidate(candidate).await;
        }
    }

    async fn apply_candidate(&self, candidate: IceCandidate) {
        let line = candidate.candidate.clone();
        if let Err(e) = self.transport.add_ice_candidate(candidate).await {
            warn!(peer = %self.peer, candidate = %line, error = %e, "Skipping rejected candidate");
        }
    }

    fn expect_state(
        &self,
        operation: &'static str,
        expected: NegotiationState,
    ) -> Result<(), PeerError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(PeerError::NegotiationState {
                peer: self.peer.clone(),
                operation,
                state: self.state,
            })
        }
    }

    fn transition(&mut self, next: NegotiationState) {
        if self.state != next {
            debug!(peer = %self.peer, from = %self.state, to = %next, "Negotiation state change");
            self.state = next;
        }
    }
}
