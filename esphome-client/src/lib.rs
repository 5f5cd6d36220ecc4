//! Private HTTP client for ESPHome slider controllers
//!
//! ESPHome devices running the `web_server` component expose every sensor
//! entity at `http://<address>/sensor/<object_id>`. This crate issues those
//! GET requests and decodes the JSON body into a [`SensorReading`]. It holds
//! no per-device state, so one client can be shared by every poll cycle and
//! survives the device address changing on a configuration reload.

mod error;
mod reading;

pub use error::{ClientError, Result};
pub use reading::SensorReading;

use std::time::Duration;

/// Default timeout applied to each sensor request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// A minimal async client for the ESPHome REST sensor endpoint
#[derive(Debug, Clone)]
pub struct EspHomeClient {
    http: reqwest::Client,
}

impl EspHomeClient {
    /// Create a new client with the default request timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(Some(DEFAULT_REQUEST_TIMEOUT))
    }

    /// Create a new client with a custom request timeout
    ///
    /// `None` disables the timeout entirely, so a device that never answers
    /// stalls the caller until the connection is dropped.
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder.build().map_err(ClientError::Build)?;
        Ok(Self { http })
    }

    /// Build the URL for a sensor entity on a device
    ///
    /// `address` is a host or `host:port`; an explicit `http://` or `https://`
    /// prefix is kept as-is.
    pub fn sensor_url(address: &str, sensor_id: &str) -> Result<String> {
        let address = address.trim().trim_end_matches('/');
        if address.is_empty() || address.contains(char::is_whitespace) {
            return Err(ClientError::InvalidAddress(address.to_string()));
        }

        if address.starts_with("http://") || address.starts_with("https://") {
            Ok(format!("{}/sensor/{}", address, sensor_id))
        } else {
            Ok(format!("http://{}/sensor/{}", address, sensor_id))
        }
    }

    /// Read a single sensor entity from the device
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Request` when the device cannot be reached,
    /// `ClientError::Status` for a non-2xx answer and `ClientError::Decode`
    /// when the body is not a sensor payload.
    pub async fn read_sensor(&self, address: &str, sensor_id: &str) -> Result<SensorReading> {
        let url = Self::sensor_url(address, sensor_id)?;

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| ClientError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| ClientError::Request {
                url: url.clone(),
                source,
            })?;

        let reading: SensorReading =
            serde_json::from_slice(&body).map_err(|source| ClientError::Decode { url, source })?;

        tracing::trace!("Read sensor {} = {}", sensor_id, reading.value);

        Ok(reading)
    }
}
