//! Sensor reading collection
//!
//! One poll cycle reads every configured slider sensor in order and assembles
//! the results into a [`ReadingVector`]. When any read fails the cycle is
//! abandoned and the last complete vector is handed out instead, so consumers
//! always see a vector of consistent shape.

use std::sync::Arc;

use async_trait::async_trait;
use esphome_client::{EspHomeClient, SensorReading};
use tracing::{debug, warn};

use crate::config::SliderConfig;
use crate::error::Result;
use crate::types::ReadingVector;

/// Something that can read one slider sensor from a device.
///
/// Implemented for [`EspHomeClient`]; tests substitute scripted sources.
#[async_trait]
pub trait SensorSource: Send + Sync {
    /// Read the sensor `sensor_id` from the device at `address`
    async fn fetch_reading(&self, address: &str, sensor_id: &str) -> Result<SensorReading>;
}

#[async_trait]
impl SensorSource for EspHomeClient {
    async fn fetch_reading(&self, address: &str, sensor_id: &str) -> Result<SensorReading> {
        Ok(self.read_sensor(address, sensor_id).await?)
    }
}

/// Collects reading vectors for the configured sliders
pub struct SensorFetcher {
    source: Arc<dyn SensorSource>,
    device_address: String,
    slider_names: Vec<String>,
    last_good: ReadingVector,
    verbose: bool,
}

impl SensorFetcher {
    pub fn new(source: Arc<dyn SensorSource>, config: &SliderConfig) -> Self {
        Self {
            source,
            device_address: config.device_address.clone(),
            slider_names: config.slider_names.clone(),
            last_good: Vec::new(),
            verbose: config.verbose,
        }
    }

    /// Switch to the device and sliders of a reloaded configuration
    ///
    /// The cached vector is discarded when the slider list changes, since it
    /// no longer lines up with the configured sliders.
    pub fn apply_config(&mut self, config: &SliderConfig) {
        if self.slider_names != config.slider_names {
            self.slider_names = config.slider_names.clone();
            self.last_good.clear();
        }
        self.device_address = config.device_address.clone();
        self.verbose = config.verbose;
    }

    /// The last vector read completely, empty if no cycle has succeeded yet
    pub fn last_good_vector(&self) -> &[i32] {
        &self.last_good
    }

    pub fn device_address(&self) -> &str {
        &self.device_address
    }

    pub fn slider_count(&self) -> usize {
        self.slider_names.len()
    }

    /// Read every slider once, stopping at the first failure
    pub async fn fetch_vector(&mut self) -> Result<ReadingVector> {
        let mut results = Vec::with_capacity(self.slider_names.len());

        for sensor_id in &self.slider_names {
            let reading = self
                .source
                .fetch_reading(&self.device_address, sensor_id)
                .await?;
            results.push(reading.value);
        }

        self.last_good = results.clone();
        Ok(results)
    }

    /// Read the next vector, falling back to the last good one on failure
    pub async fn next_vector(&mut self) -> ReadingVector {
        match self.fetch_vector().await {
            Ok(results) => {
                if self.verbose {
                    debug!("Read new results: {:?}", results);
                }
                results
            }
            Err(e) => {
                if self.verbose {
                    warn!(
                        "Failed to read results from {}, reusing {:?}: {}",
                        self.device_address, self.last_good, e
                    );
                } else {
                    debug!("Failed to read results from {}: {}", self.device_address, e);
                }
                self.last_good.clone()
            }
        }
    }
}
