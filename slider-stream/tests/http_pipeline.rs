//! Poll loop against a mock ESPHome web server

use std::time::Duration;

use mockito::Server;
use slider_stream::{SliderConfig, SliderConnection, SliderMoveEvent, StreamConfig};
use tokio::sync::watch;

fn sensor_body(id: &str, value: i32) -> String {
    format!(r#"{{"id":"sensor-{id}","state":"{value}","value":{value}}}"#)
}

#[tokio::test]
async fn test_polls_device_over_http() {
    let mut server = Server::new_async().await;
    let first = server
        .mock("GET", "/sensor/slider_1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(sensor_body("slider_1", 1023))
        .expect_at_least(1)
        .create_async()
        .await;
    let second = server
        .mock("GET", "/sensor/slider_2")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(sensor_body("slider_2", 256))
        .expect_at_least(1)
        .create_async()
        .await;

    let config = SliderConfig::new(server.host_with_port(), ["slider_1", "slider_2"]);
    let (_config_tx, config_rx) = watch::channel(config);
    let stream = StreamConfig::new().with_request_timeout(Some(Duration::from_secs(1)));
    let connection = SliderConnection::with_stream_config(config_rx, stream).unwrap();
    let mut events = connection.subscribe();

    connection.start().await.unwrap();

    let timeout = Duration::from_secs(5);
    assert_eq!(
        events.recv_timeout(timeout).await,
        Some(SliderMoveEvent::new(0, 1.0))
    );
    assert_eq!(
        events.recv_timeout(timeout).await,
        Some(SliderMoveEvent::new(1, 0.25))
    );

    connection.stop().await.unwrap();
    connection.shutdown().await.unwrap();

    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_server_errors_produce_no_events() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/sensor/slider_1")
        .with_status(500)
        .create_async()
        .await;

    let config = SliderConfig::new(server.host_with_port(), ["slider_1"]).with_verbose(true);
    let (_config_tx, config_rx) = watch::channel(config);
    let connection = SliderConnection::new(config_rx).unwrap();
    let mut events = connection.subscribe();

    connection.start().await.unwrap();

    assert!(events
        .recv_timeout(Duration::from_millis(300))
        .await
        .is_none());
    assert!(connection.is_connected());

    connection.shutdown().await.unwrap();
}
