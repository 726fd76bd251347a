use vt_core::ServerSignal;

use crate::integration::{create_test_broker, init_tracing};
use crate::utils::TestConnection;

#[tokio::test]
async fn test_disconnect_notifies_remaining() {
    init_tracing();

    let broker = create_test_broker();

    let mut donor = TestConnection::accept(&broker).await.unwrap();
    let mut donee = TestConnection::accept(&broker).await.unwrap();
    let mut bystander = TestConnection::accept(&broker).await.unwrap();

    donor.join_and_list("shared").await.unwrap();
    donee.join_and_list("shared").await.unwrap();
    donor.recv().await.unwrap();
    bystander.join_and_list("elsewhere").await.unwrap();

    donee.disconnect().await.unwrap();

    match donor.recv().await.unwrap() {
        ServerSignal::RemovePeerConnected { socket_id } => assert_eq!(socket_id, donee.id),
        other => panic!("Expected remove_peer_connected, got {other:?}"),
    }
    bystander
        .expect_silence()
        .await
        .expect("Other rooms are not notified");

    let rooms = broker.list_rooms().await.unwrap();
    let shared = rooms
        .iter()
        .find(|r| r.room_name.as_str() == "shared")
        .expect("Room with a remaining member survives");
    assert_eq!(shared.members, 1);
}
