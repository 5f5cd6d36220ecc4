//! # slider-stream
//!
//! Polls an ESPHome slider controller over its REST API and turns the raw
//! readings into a stream of normalized slider move events.
//!
//! ## Overview
//!
//! Each poll cycle reads every configured slider sensor in order. Readings are
//! normalized to a two-decimal position between 0.0 and 1.0, filtered against a
//! noise threshold and compared with the last reported position of each
//! slider. Only real movements are delivered to subscribers.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use slider_stream::prelude::*;
//! use tokio::sync::watch;
//!
//! let config = SliderConfig::new("192.168.1.40", ["slider_1", "slider_2"])
//!     .with_noise_reduction(NoiseReduction::Level(NoiseLevel::Low));
//! let (config_tx, config_rx) = watch::channel(config);
//!
//! let connection = SliderConnection::new(config_rx)?;
//! let mut events = connection.subscribe();
//! connection.start().await?;
//!
//! while let Some(event) = events.recv().await {
//!     println!("slider {} is at {:.2}", event.slider_index, event.percent_value);
//! }
//! ```
//!
//! ## Architecture
//!
//! 1. **Worker**: a single background task owns the device state and runs the poll loop
//! 2. **Fetcher**: reads one vector per cycle, reusing the last good vector on failure
//! 3. **Detector**: turns vectors into move events, re-reporting everything when the
//!    slider count changes
//! 4. **Broadcaster**: fans events out to bounded per-subscriber queues
//! 5. **Reload**: applies new configuration immediately and re-reports every slider
//!    after a short delay

pub mod broadcaster;
pub mod config;
pub mod connection;
pub mod detector;
pub mod error;
pub mod events;
pub mod fetcher;
pub mod normalizer;
pub mod reload;
pub mod types;
mod worker;

pub use config::{DeliveryPolicy, NoiseLevel, NoiseReduction, SliderConfig, StreamConfig};
pub use connection::SliderConnection;
pub use error::{Result, SliderError};
pub use events::SliderEvents;
pub use fetcher::SensorSource;
pub use types::{ConnectionState, ReadingVector, SliderMoveEvent, SliderPercent};

// Re-export client types used in the public API
pub use esphome_client::{ClientError, EspHomeClient, SensorReading};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ConnectionState, DeliveryPolicy, NoiseLevel, NoiseReduction, Result, SensorReading,
        SensorSource, SliderConfig, SliderConnection, SliderError, SliderEvents, SliderMoveEvent,
        StreamConfig,
    };
}
