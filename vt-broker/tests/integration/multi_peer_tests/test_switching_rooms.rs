use vt_core::ServerSignal;

use crate::integration::{create_test_broker, init_tracing};
use crate::utils::TestConnection;

#[tokio::test]
async fn test_switching_rooms() {
    init_tracing();

    let broker = create_test_broker();

    let mut a = TestConnection::accept(&broker).await.unwrap();
    let mut b = TestConnection::accept(&broker).await.unwrap();

    a.join_and_list("first").await.unwrap();
    b.join_and_list("first").await.unwrap();
    a.recv().await.unwrap();

    // Joining a second room leaves the first
    let peers = b.join_and_list("second").await.unwrap();
    assert!(peers.is_empty());

    match a.recv().await.unwrap() {
        ServerSignal::RemovePeerConnected { socket_id } => assert_eq!(socket_id, b.id),
        other => panic!("Expected remove_peer_connected, got {other:?}"),
    }

    // Rejoining the same room replies again but does not re-notify
    let peers = a.join_and_list("first").await.unwrap();
    assert!(peers.is_empty());
    b.expect_silence().await.unwrap();

    let rooms = broker.list_rooms().await.unwrap();
    assert_eq!(rooms.len(), 2);
    assert!(rooms.iter().all(|r| r.members == 1));
}
