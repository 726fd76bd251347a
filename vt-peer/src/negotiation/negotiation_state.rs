use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NegotiationState {
    #[default]
    NoSession,
    /// Local offer set, waiting on the remote answer.
    OfferPending,
    /// Remote offer received, local answer not yet produced.
    AnswerPending,
    RemoteDescriptionSet,
    Established,
}

impl NegotiationState {
    /// Whether a remote candidate can be handed to the transport right away.
    pub fn accepts_candidates(self) -> bool {
        matches!(
            self,
            NegotiationState::RemoteDescriptionSet | NegotiationState::Established
        )
    }
}

impl fmt::Display for NegotiationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NegotiationState::NoSession => "no_session",
            NegotiationState::OfferPending => "offer_pending",
            NegotiationState::AnswerPending => "answer_pending",
            NegotiationState::RemoteDescriptionSet => "remote_description_set",
            NegotiationState::Established => "established",
        };
        f.write_str(name)
    }
}
