use crate::utils::{MockTransport, TransportCall};
use anyhow::Result;
use vt_core::{ConnectionId, IceCandidate, SdpType, SessionDescription};
use vt_peer::{NegotiationEngine, NegotiationState};

#[tokio::test]
async fn test_candidates_wait_for_remote_answer() -> Result<()> {
    let (transport, _events) = MockTransport::standalone("donee");
    let mut engine = NegotiationEngine::new(ConnectionId::from("donee"), transport.clone());
    engine.create_offer().await?;

    engine
        .enqueue_or_apply_candidate(IceCandidate::new("candidate:1"))
        .await;
    engine
        .enqueue_or_apply_candidate(IceCandidate::new("candidate:2"))
        .await;

    assert_eq!(engine.queued_candidates(), 2);
    assert!(transport.applied_candidates().is_empty());

    engine
        .apply_remote_answer(SessionDescription::answer("v=0"))
        .await?;

    assert_eq!(engine.queued_candidates(), 0);
    assert_eq!(transport.applied_candidates(), ["candidate:1", "candidate:2"]);

    let remote = transport
        .position(&TransportCall::SetRemote(SdpType::Answer))
        .unwrap();
    let first = transport
        .position(&TransportCall::AddCandidate("candidate:1".into()))
        .unwrap();
    assert!(remote < first);

    engine
        .enqueue_or_apply_candidate(IceCandidate::new("candidate:3"))
        .await;
    assert_eq!(
        transport.applied_candidates(),
        ["candidate:1", "candidate:2", "candidate:3"]
    );
    Ok(())
}

#[tokio::test]
async fn test_candidates_before_remote_offer() -> Result<()> {
    let (transport, _events) = MockTransport::standalone("donor");
    let mut engine = NegotiationEngine::new(ConnectionId::from("donor"), transport.clone());

    engine
        .enqueue_or_apply_candidate(IceCandidate::new("candidate:early"))
        .await;
    assert_eq!(engine.state(), NegotiationState::NoSession);
    assert_eq!(engine.queued_candidates(), 1);

    engine
        .apply_remote_offer(SessionDescription::offer("v=0"))
        .await?;

    assert_eq!(
        transport.calls(),
        vec![
            TransportCall::SetRemote(SdpType::Offer),
            TransportCall::AddCandidate("candidate:early".into()),
            TransportCall::CreateAnswer,
            TransportCall::SetLocal(SdpType::Answer),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_rejected_candidate_is_skipped_on_both_paths() -> Result<()> {
    let (transport, _events) = MockTransport::standalone("donee");
    transport.reject_candidate("candidate:bad");
    let mut engine = NegotiationEngine::new(ConnectionId::from("donee"), transport.clone());
    engine.create_offer().await?;

    engine
        .enqueue_or_apply_candidate(IceCandidate::new("candidate:bad"))
        .await;
    engine
        .enqueue_or_apply_candidate(IceCandidate::new("candidate:1"))
        .await;

    engine
        .apply_remote_answer(SessionDescription::answer("v=0"))
        .await?;
    assert_eq!(engine.state(), NegotiationState::RemoteDescriptionSet);
    assert_eq!(engine.queued_candidates(), 0);
    assert_eq!(transport.applied_candidates(), ["candidate:1"]);

    engine
        .enqueue_or_apply_candidate(IceCandidate::new("candidate:bad"))
        .await;
    engine
        .enqueue_or_apply_candidate(IceCandidate::new("candidate:2"))
        .await;
    assert_eq!(engine.state(), NegotiationState::RemoteDescriptionSet);
    assert_eq!(transport.applied_candidates(), ["candidate:1", "candidate:2"]);
    Ok(())
}
