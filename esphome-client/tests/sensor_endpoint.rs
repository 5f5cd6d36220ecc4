//! Integration tests for the ESPHome sensor endpoint client.
//!
//! A mockito server stands in for the device web server so status codes and
//! payload shapes can be exercised without hardware.

use esphome_client::{ClientError, EspHomeClient};
use mockito::Server;
use std::time::Duration;

#[tokio::test]
async fn test_reads_sensor_value() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/sensor/slider_1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"sensor-slider_1","state":"734","value":734}"#)
        .create_async()
        .await;

    let client = EspHomeClient::new().expect("client");
    let reading = client
        .read_sensor(&server.host_with_port(), "slider_1")
        .await
        .expect("reading");

    assert_eq!(reading.id, "sensor-slider_1");
    assert_eq!(reading.value, 734);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_success_status_is_an_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/sensor/missing")
        .with_status(404)
        .create_async()
        .await;

    let client = EspHomeClient::new().expect("client");
    let error = client
        .read_sensor(&server.host_with_port(), "missing")
        .await
        .unwrap_err();

    match error {
        ClientError::Status { status, url } => {
            assert_eq!(status, 404);
            assert!(url.ends_with("/sensor/missing"));
        }
        other => panic!("Expected Status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_a_decode_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/sensor/slider_1")
        .with_status(200)
        .with_body("<html>not json</html>")
        .create_async()
        .await;

    let client = EspHomeClient::new().expect("client");
    let error = client
        .read_sensor(&server.host_with_port(), "slider_1")
        .await
        .unwrap_err();

    assert!(matches!(error, ClientError::Decode { .. }));
}

#[tokio::test]
async fn test_unreachable_device_is_a_request_error() {
    // Bind and immediately release a port so nothing is listening on it
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let client = EspHomeClient::with_timeout(Some(Duration::from_millis(500))).expect("client");
    let error = client
        .read_sensor(&format!("127.0.0.1:{}", port), "slider_1")
        .await
        .unwrap_err();

    assert!(matches!(error, ClientError::Request { .. }));
}
