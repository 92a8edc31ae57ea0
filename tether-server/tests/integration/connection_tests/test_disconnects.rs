use tether_core::{ConnId, ServerMessage};

use crate::integration::init_tracing;
use crate::utils::{close, connect_streamer, connect_viewer, deliver, settle, spawn_hub};

#[tokio::test]
async fn test_viewer_close_notifies_streamer() {
    init_tracing();
    let (handle, tx, sink) = spawn_hub();

    let streamer = connect_streamer(&tx, &sink).await;
    let viewer = connect_viewer(&tx, &sink).await;
    close(&tx, &viewer).await;
    settle(&handle).await;

    assert_eq!(
        sink.messages_to(&streamer),
        vec![ServerMessage::ViewerReady, ServerMessage::ViewerDisconnected]
    );

    let status = handle.status().await.unwrap();
    assert!(!status.connected);

    let summary = handle.summary().await.unwrap();
    assert!(!summary.viewer_connected);
    assert!(summary.streamer_connected);
}

#[tokio::test]
async fn test_streamer_close_clears_streaming() {
    init_tracing();
    let (handle, tx, sink) = spawn_hub();

    let viewer = connect_viewer(&tx, &sink).await;
    let streamer = connect_streamer(&tx, &sink).await;
    deliver(&tx, &streamer, r#"{"type":"offer","sdp":"v=0"}"#).await;
    settle(&handle).await;
    assert!(handle.status().await.unwrap().streaming);

    close(&tx, &streamer).await;
    settle(&handle).await;

    let status = handle.status().await.unwrap();
    assert!(!status.connected);
    assert!(!status.streaming);

    assert_eq!(
        sink.messages_to(&viewer).last(),
        Some(&ServerMessage::StreamerDisconnected)
    );
}

#[tokio::test]
async fn test_close_of_unregistered_connection_is_noop() {
    init_tracing();
    let (handle, tx, sink) = spawn_hub();

    let streamer = connect_streamer(&tx, &sink).await;
    let viewer = connect_viewer(&tx, &sink).await;
    settle(&handle).await;

    let before_status = handle.status().await.unwrap();
    let viewer_traffic = sink.messages_to(&viewer).len();
    let streamer_traffic = sink.messages_to(&streamer).len();

    let stranger = ConnId::new();
    sink.connect(&stranger);
    close(&tx, &stranger).await;
    settle(&handle).await;

    assert_eq!(handle.status().await.unwrap(), before_status);
    assert_eq!(sink.messages_to(&viewer).len(), viewer_traffic);
    assert_eq!(sink.messages_to(&streamer).len(), streamer_traffic);

    let summary = handle.summary().await.unwrap();
    assert!(summary.viewer_connected);
    assert!(summary.streamer_connected);
}

#[tokio::test]
async fn test_stale_close_does_not_evict_replacement() {
    init_tracing();
    let (handle, tx, sink) = spawn_hub();

    let old = connect_viewer(&tx, &sink).await;
    let _new = connect_viewer(&tx, &sink).await;

    // The close event for the replaced connection arrives late.
    close(&tx, &old).await;
    settle(&handle).await;

    let summary = handle.summary().await.unwrap();
    assert!(summary.viewer_connected);
}
