use crate::utils::{ExecEvent, SessionHarness, TransportCall, test_config};
use anyhow::Result;
use std::time::Duration;
use vt_core::{ConnectionId, ServerSignal};
use vt_peer::{FailurePolicy, PeerError};

#[tokio::test]
async fn test_failed_offer_discards_record_and_allows_retry() -> Result<()> {
    let mut donor = SessionHarness::donor_failing_offers(test_config());
    donor.join("donor", &[]).await?;
    let donee = ConnectionId::from("donee");

    donor.deliver(ServerSignal::NewPeerConnected {
        socket_id: donee.clone(),
    });
    let first = donor.next_transport().await?;

    match donor.next_exec_event().await? {
        ExecEvent::Failed(peer, error) => {
            assert_eq!(peer, donee);
            assert!(error.contains("offer rejected"), "{error}");
        }
        other => panic!("expected a failure, got {other:?}"),
    }
    assert_eq!(donor.ctx.negotiation_state(&donee), None);
    assert!(first.calls().contains(&TransportCall::Close));
    assert!(!donor.task.is_finished());

    // The peer announces itself again and gets a fresh record.
    donor.deliver(ServerSignal::NewPeerConnected {
        socket_id: donee.clone(),
    });
    let second = donor.next_transport().await?;
    assert_eq!(second.peer, donee);
    assert!(matches!(
        donor.next_exec_event().await?,
        ExecEvent::Failed(ref peer, _) if *peer == donee
    ));

    donor.expect_no_signal().await?;
    Ok(())
}

#[tokio::test]
async fn test_failed_offer_ends_session_when_configured() -> Result<()> {
    let mut config = test_config();
    config.negotiation_failure = FailurePolicy::Fail;
    let mut donor = SessionHarness::donor_failing_offers(config);
    donor.join("donor", &["donee"]).await?;

    let transport = donor.next_transport().await?;
    assert!(matches!(
        donor.next_exec_event().await?,
        ExecEvent::Failed(..)
    ));

    let result = tokio::time::timeout(Duration::from_secs(2), donor.task).await??;
    assert!(matches!(result, Err(PeerError::Transport(_))), "{result:?}");
    assert!(transport.calls().contains(&TransportCall::Close));
    Ok(())
}
