//! Error types for the esphome-client crate.

/// Errors that can occur while reading a sensor from an ESPHome device.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The underlying HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// The configured device address cannot be turned into a URL
    #[error("Invalid device address: {0:?}")]
    InvalidAddress(String),

    /// The request could not be sent or the body could not be read
    #[error("Request to {url} failed: {source}")]
    Request {
        /// The sensor URL that was requested
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The device answered with a non-success status code
    #[error("Request to {url} returned HTTP {status}")]
    Status {
        /// The sensor URL that was requested
        url: String,
        /// The HTTP status code returned by the device
        status: u16,
    },

    /// The response body is not a valid sensor payload
    #[error("Failed to decode sensor payload from {url}: {source}")]
    Decode {
        /// The sensor URL that was requested
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using ClientError.
pub type Result<T> = std::result::Result<T, ClientError>;
