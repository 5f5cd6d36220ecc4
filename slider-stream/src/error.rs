//! Error types for the slider-stream crate.

use esphome_client::ClientError;

/// Errors that can occur while polling sliders or driving the connection.
#[derive(Debug, thiserror::Error)]
pub enum SliderError {
    /// `start()` was called while a connection is already active
    #[error("Slider connection already active; stop it before starting another")]
    AlreadyConnected,

    /// The ESPHome client failed to read a sensor
    #[error("ESPHome request failed: {0}")]
    Client(#[from] ClientError),

    /// A sensor source other than the HTTP client could not produce a reading
    #[error("Sensor {sensor_id} unavailable: {reason}")]
    SensorUnavailable {
        /// The sensor entity that failed
        sensor_id: String,
        /// Why the reading failed
        reason: String,
    },

    /// Invalid configuration provided
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The background worker has exited and can no longer accept commands
    #[error("Slider worker is no longer running")]
    WorkerDisconnected,
}

/// Convenience type alias for Results using SliderError.
pub type Result<T> = std::result::Result<T, SliderError>;
