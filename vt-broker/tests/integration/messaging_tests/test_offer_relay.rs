use serde_json::json;

use vt_core::{ClientSignal, ServerSignal};

use crate::integration::{create_test_broker, init_tracing};
use crate::utils::TestConnection;

#[tokio::test]
async fn test_offer_relay() {
    init_tracing();

    let broker = create_test_broker();

    let mut a = TestConnection::accept(&broker).await.unwrap();
    let mut b = TestConnection::accept(&broker).await.unwrap();
    a.join_and_list("room").await.unwrap();
    b.join_and_list("room").await.unwrap();
    a.recv().await.unwrap();

    let sdp_text = "v=0\r\no=- 4611731400430051336 2 IN IP4 127.0.0.1\r\ns=-\r\nt=0 0\r\n";
    let sdp = json!({"type": "offer", "sdp": sdp_text});

    a.send(ClientSignal::SendOffer {
        socket_id: b.id.clone(),
        sdp: sdp.clone(),
    })
    .await
    .unwrap();

    match b.recv().await.unwrap() {
        ServerSignal::ReceiveOffer {
            socket_id,
            sdp: relayed,
        } => {
            assert_eq!(socket_id, a.id, "Sender id replaces the target id");
            assert_eq!(relayed, sdp);
            assert_eq!(relayed["sdp"].as_str(), Some(sdp_text));
        }
        other => panic!("Expected receive_offer, got {other:?}"),
    }

    a.expect_silence().await.expect("Sender gets no echo");
}
