use crate::integration::{create_test_broker, init_tracing};
use crate::utils::TestConnection;

#[tokio::test]
async fn test_join_empty_room() {
    init_tracing();

    let broker = create_test_broker();
    let mut conn = TestConnection::accept(&broker)
        .await
        .expect("Failed to accept connection");

    // Accepting alone fires nothing
    conn.expect_silence().await.expect("No event before join");

    let peers = conn.join_and_list("lobby").await.expect("Join failed");
    assert!(peers.is_empty(), "First member sees an empty room");

    let rooms = broker.list_rooms().await.expect("List rooms failed");
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].room_name.as_str(), "lobby");
    assert_eq!(rooms[0].members, 1);
}
