//! Test helpers for driving a slider connection without a device

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use slider_stream::{
    Result, SensorReading, SensorSource, SliderConfig, SliderConnection, SliderError,
    SliderEvents, SliderMoveEvent, StreamConfig,
};
use tokio::sync::watch;

/// Simulated time one sensor read takes
pub const READ_LATENCY: Duration = Duration::from_millis(5);

/// How long to wait before deciding no more events are coming
pub const QUIET_PERIOD: Duration = Duration::from_millis(200);

/// Sensor source serving values from a map that tests can change at any time
#[derive(Default)]
pub struct ScriptedSource {
    values: Mutex<HashMap<String, i32>>,
    failing: AtomicBool,
    requests: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set(&self, sensor: &str, value: i32) {
        self.values.lock().insert(sensor.to_string(), value);
    }

    /// Make every read fail until called again with `false`
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SensorSource for ScriptedSource {
    async fn fetch_reading(&self, _address: &str, sensor_id: &str) -> Result<SensorReading> {
        tokio::time::sleep(READ_LATENCY).await;
        self.requests.fetch_add(1, Ordering::SeqCst);

        if self.failing.load(Ordering::SeqCst) {
            return Err(SliderError::SensorUnavailable {
                sensor_id: sensor_id.to_string(),
                reason: "connection refused".to_string(),
            });
        }

        match self.values.lock().get(sensor_id) {
            Some(value) => Ok(SensorReading::new(sensor_id, *value)),
            None => Err(SliderError::SensorUnavailable {
                sensor_id: sensor_id.to_string(),
                reason: "404 Not Found".to_string(),
            }),
        }
    }
}

/// Route worker logs to the test output; `RUST_LOG` selects what is shown
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Connection over `source` plus the sender used to reload its configuration
pub fn connect(
    source: &Arc<ScriptedSource>,
    config: SliderConfig,
) -> (SliderConnection, watch::Sender<SliderConfig>) {
    init_tracing();
    let (config_tx, config_rx) = watch::channel(config);
    let connection = SliderConnection::with_source(config_rx, StreamConfig::default(), source.clone())
        .expect("connection should build");
    (connection, config_tx)
}

/// Receive events until none arrive for [`QUIET_PERIOD`]
pub async fn drain(events: &mut SliderEvents) -> Vec<SliderMoveEvent> {
    let mut received = Vec::new();
    while let Some(event) = events.recv_timeout(QUIET_PERIOD).await {
        received.push(event);
    }
    received
}

pub fn indices(events: &[SliderMoveEvent]) -> Vec<usize> {
    events.iter().map(|e| e.slider_index).collect()
}
