use tether_core::ConnId;

use crate::integration::init_tracing;
use crate::utils::{connect_streamer, connect_viewer, deliver, settle, spawn_hub};

#[tokio::test]
async fn test_offer_relayed_to_viewer_verbatim() {
    init_tracing();
    let (handle, tx, sink) = spawn_hub();

    let viewer = connect_viewer(&tx, &sink).await;
    let streamer = connect_streamer(&tx, &sink).await;

    // Fields outside the schema must survive the hop untouched.
    let raw = r#"{"type":"offer","sdp":"v=0 fake","sdpType":"offer","x":1}"#;
    deliver(&tx, &streamer, raw).await;
    settle(&handle).await;

    assert_eq!(sink.sent_to(&viewer).last().map(String::as_str), Some(raw));
    assert!(handle.status().await.unwrap().streaming);
}

#[tokio::test]
async fn test_offer_without_viewer_sets_streaming_only() {
    init_tracing();
    let (handle, tx, sink) = spawn_hub();

    let streamer = connect_streamer(&tx, &sink).await;
    deliver(&tx, &streamer, r#"{"type":"offer","sdp":"v=0"}"#).await;
    settle(&handle).await;

    assert!(handle.status().await.unwrap().streaming);
    assert!(sink.sent_to(&streamer).is_empty());
}

#[tokio::test]
async fn test_answer_relayed_to_streamer() {
    init_tracing();
    let (handle, tx, sink) = spawn_hub();

    let viewer = connect_viewer(&tx, &sink).await;
    let streamer = connect_streamer(&tx, &sink).await;

    let raw = r#"{"type":"answer","sdp":"v=0 answer"}"#;
    deliver(&tx, &viewer, raw).await;
    settle(&handle).await;

    assert_eq!(
        sink.sent_to(&streamer).last().map(String::as_str),
        Some(raw)
    );
}

#[tokio::test]
async fn test_answer_without_streamer_is_dropped() {
    init_tracing();
    let (handle, tx, sink) = spawn_hub();

    let viewer = connect_viewer(&tx, &sink).await;
    deliver(&tx, &viewer, r#"{"type":"answer","sdp":"v=0"}"#).await;
    settle(&handle).await;

    // Only the registration snapshot reached the viewer; the answer went
    // nowhere.
    assert_eq!(sink.sent_to(&viewer).len(), 1);
}

#[tokio::test]
async fn test_candidate_routing_follows_sender_role() {
    init_tracing();
    let (handle, tx, sink) = spawn_hub();

    let viewer = connect_viewer(&tx, &sink).await;
    let streamer = connect_streamer(&tx, &sink).await;

    let from_viewer = r#"{"type":"candidate","candidate":"candidate:v"}"#;
    deliver(&tx, &viewer, from_viewer).await;

    let from_streamer = r#"{"type":"candidate","candidate":"candidate:s"}"#;
    deliver(&tx, &streamer, from_streamer).await;
    settle(&handle).await;

    assert_eq!(
        sink.sent_to(&streamer).last().map(String::as_str),
        Some(from_viewer)
    );
    assert_eq!(
        sink.sent_to(&viewer).last().map(String::as_str),
        Some(from_streamer)
    );
}

#[tokio::test]
async fn test_candidate_from_unregistered_connection_is_dropped() {
    init_tracing();
    let (handle, tx, sink) = spawn_hub();

    let viewer = connect_viewer(&tx, &sink).await;
    let streamer = connect_streamer(&tx, &sink).await;
    settle(&handle).await;
    let viewer_traffic = sink.sent_to(&viewer).len();
    let streamer_traffic = sink.sent_to(&streamer).len();

    let stranger = ConnId::new();
    sink.connect(&stranger);
    deliver(&tx, &stranger, r#"{"type":"candidate","candidate":"c"}"#).await;
    settle(&handle).await;

    assert_eq!(sink.sent_to(&viewer).len(), viewer_traffic);
    assert_eq!(sink.sent_to(&streamer).len(), streamer_traffic);
    assert!(sink.sent_to(&stranger).is_empty());
}

#[tokio::test]
async fn test_offer_dropped_when_viewer_closed() {
    init_tracing();
    let (handle, tx, sink) = spawn_hub();

    let viewer = connect_viewer(&tx, &sink).await;
    let streamer = connect_streamer(&tx, &sink).await;
    settle(&handle).await;
    let viewer_traffic = sink.sent_to(&viewer).len();

    // Registered but no longer writable.
    sink.disconnect(&viewer);
    deliver(&tx, &streamer, r#"{"type":"offer","sdp":"v=0"}"#).await;
    settle(&handle).await;

    assert_eq!(sink.sent_to(&viewer).len(), viewer_traffic);
    assert!(handle.status().await.unwrap().streaming);
}
