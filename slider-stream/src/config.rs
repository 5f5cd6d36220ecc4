//! Configuration types for the slider-stream crate
//!
//! [`SliderConfig`] is what the owning application loads from its config file
//! and republishes on every reload. [`StreamConfig`] holds runtime tuning for
//! the poll loop and event delivery that does not change on reload.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SliderError};

/// Named noise-reduction presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseLevel {
    /// Report small movements (0.015)
    Low,
    /// Balanced filtering (0.025)
    Default,
    /// Ignore everything but deliberate movements (0.035)
    High,
}

/// Minimum change in normalized position that counts as a real movement.
///
/// Deserializes from either a preset name (`"low"`, `"default"`, `"high"`) or
/// a plain number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NoiseReduction {
    Level(NoiseLevel),
    Threshold(f32),
}

impl NoiseReduction {
    /// The absolute threshold a change must exceed to be reported.
    pub fn threshold(&self) -> f32 {
        match self {
            NoiseReduction::Level(NoiseLevel::Low) => 0.015,
            NoiseReduction::Level(NoiseLevel::Default) => 0.025,
            NoiseReduction::Level(NoiseLevel::High) => 0.035,
            NoiseReduction::Threshold(value) => *value,
        }
    }
}

impl Default for NoiseReduction {
    fn default() -> Self {
        NoiseReduction::Level(NoiseLevel::Default)
    }
}

/// Device and slider settings supplied by the owning application
///
/// Every update published on the configuration watch channel is treated as a
/// reload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliderConfig {
    /// Host or `host:port` of the ESPHome device
    /// Default: "esphome.local"
    pub device_address: String,

    /// Sensor entity ids, one per slider, in slider order; at least one is required
    /// Default: empty
    pub slider_names: Vec<String>,

    /// Report `1 - value` instead of the raw position
    /// Default: false
    pub invert_sliders: bool,

    /// Noise filter applied to normalized positions
    /// Default: "default" (0.025)
    pub noise_reduction: NoiseReduction,

    /// Log every read cycle and every move event
    /// Default: false
    pub verbose: bool,
}

impl Default for SliderConfig {
    fn default() -> Self {
        Self {
            device_address: "esphome.local".to_string(),
            slider_names: Vec::new(),
            invert_sliders: false,
            noise_reduction: NoiseReduction::default(),
            verbose: false,
        }
    }
}

impl SliderConfig {
    /// Create a config for a device and its slider sensors
    pub fn new<I, S>(device_address: impl Into<String>, slider_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            device_address: device_address.into(),
            slider_names: slider_names.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_inverted_sliders(mut self, invert: bool) -> Self {
        self.invert_sliders = invert;
        self
    }

    pub fn with_noise_reduction(mut self, noise_reduction: NoiseReduction) -> Self {
        self.noise_reduction = noise_reduction;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Number of sliders this config describes
    pub fn slider_count(&self) -> usize {
        self.slider_names.len()
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<()> {
        if self.device_address.trim().is_empty() {
            return Err(SliderError::Configuration(
                "Device address must not be empty".to_string(),
            ));
        }

        if self.slider_names.is_empty() {
            return Err(SliderError::Configuration(
                "At least one slider name is required".to_string(),
            ));
        }

        if let Some(index) = self.slider_names.iter().position(|n| n.trim().is_empty()) {
            return Err(SliderError::Configuration(format!(
                "Slider name at index {} is empty",
                index
            )));
        }

        let threshold = self.noise_reduction.threshold();
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(SliderError::Configuration(format!(
                "Noise reduction threshold must be a non-negative number, got {}",
                threshold
            )));
        }

        Ok(())
    }
}

/// How a subscriber's queue behaves when it is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryPolicy {
    /// Never wait; events that do not fit are dropped and counted
    DropWhenFull,
    /// Wait up to `timeout` per event for room, then drop it
    Backpressure { timeout: Duration },
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        DeliveryPolicy::DropWhenFull
    }
}

/// Runtime tuning for the poll loop and event delivery
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Delay between a configuration reload and the slider-count reset
    /// Default: 50 milliseconds
    pub reload_reset_delay: Duration,

    /// Queue capacity of each subscriber
    /// Default: 64
    pub subscriber_buffer: usize,

    /// Delivery policy for subscribers created with `subscribe()`
    /// Default: DropWhenFull
    pub delivery_policy: DeliveryPolicy,

    /// Timeout for each sensor request; `None` waits forever
    /// Default: 2 seconds
    pub request_timeout: Option<Duration>,

    /// Capacity of the worker command queue
    /// Default: 16
    pub command_buffer: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            reload_reset_delay: Duration::from_millis(50),
            subscriber_buffer: 64,
            delivery_policy: DeliveryPolicy::DropWhenFull,
            request_timeout: Some(esphome_client::DEFAULT_REQUEST_TIMEOUT),
            command_buffer: 16,
        }
    }
}

impl StreamConfig {
    /// Create a StreamConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<()> {
        if self.subscriber_buffer == 0 {
            return Err(SliderError::Configuration(
                "Subscriber buffer size must be greater than 0".to_string(),
            ));
        }

        if self.command_buffer == 0 {
            return Err(SliderError::Configuration(
                "Command buffer size must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout == Some(Duration::ZERO) {
            return Err(SliderError::Configuration(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Builder pattern methods for fluent configuration

    pub fn with_reload_reset_delay(mut self, delay: Duration) -> Self {
        self.reload_reset_delay = delay;
        self
    }

    pub fn with_subscriber_buffer(mut self, size: usize) -> Self {
        self.subscriber_buffer = size;
        self
    }

    pub fn with_delivery_policy(mut self, policy: DeliveryPolicy) -> Self {
        self.delivery_policy = policy;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_config() {
        let config = SliderConfig::default();
        assert_eq!(config.device_address, "esphome.local");
        assert!(config.slider_names.is_empty());
        assert!(!config.invert_sliders);
        assert_eq!(config.noise_reduction.threshold(), 0.025);
        // Sliders must be configured explicitly
        assert!(config.validate().is_err());

        let stream = StreamConfig::default();
        assert_eq!(stream.reload_reset_delay, Duration::from_millis(50));
        assert_eq!(stream.delivery_policy, DeliveryPolicy::DropWhenFull);
        assert!(stream.validate().is_ok());
    }

    #[rstest]
    #[case(r#""low""#, 0.015)]
    #[case(r#""default""#, 0.025)]
    #[case(r#""high""#, 0.035)]
    #[case("0.05", 0.05)]
    #[case("0", 0.0)]
    fn test_noise_reduction_parsing(#[case] json: &str, #[case] expected: f32) {
        let noise: NoiseReduction = serde_json::from_str(json).unwrap();
        assert_eq!(noise.threshold(), expected);
    }

    #[test]
    fn test_unknown_noise_level_is_rejected() {
        assert!(serde_json::from_str::<NoiseReduction>(r#""extreme""#).is_err());
    }

    #[test]
    fn test_parse_config_file() {
        let json = r#"{
            "device_address": "192.168.1.40",
            "slider_names": ["slider_master", "slider_music", "slider_chat"],
            "invert_sliders": true,
            "noise_reduction": "high"
        }"#;

        let config: SliderConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.device_address, "192.168.1.40");
        assert_eq!(config.slider_count(), 3);
        assert!(config.invert_sliders);
        assert_eq!(config.noise_reduction, NoiseReduction::Level(NoiseLevel::High));
        assert!(!config.verbose);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let empty_address = SliderConfig::new("  ", ["slider_1"]);
        assert!(empty_address.validate().is_err());

        let no_sliders = SliderConfig::new("10.0.0.2", Vec::<String>::new());
        assert!(no_sliders.validate().is_err());

        let empty_name = SliderConfig::new("10.0.0.2", ["slider_1", ""]);
        assert!(empty_name.validate().is_err());

        let negative = SliderConfig::new("10.0.0.2", ["slider_1"])
            .with_noise_reduction(NoiseReduction::Threshold(-0.1));
        assert!(negative.validate().is_err());

        let nan = SliderConfig::new("10.0.0.2", ["slider_1"])
            .with_noise_reduction(NoiseReduction::Threshold(f32::NAN));
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_stream_config_validation() {
        assert!(StreamConfig::new().with_subscriber_buffer(0).validate().is_err());
        assert!(StreamConfig::new()
            .with_request_timeout(Some(Duration::ZERO))
            .validate()
            .is_err());
        assert!(StreamConfig::new().with_request_timeout(None).validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = SliderConfig::new("mixer.local", ["a", "b"])
            .with_inverted_sliders(true)
            .with_noise_reduction(NoiseReduction::Level(NoiseLevel::Low))
            .with_verbose(true);

        assert_eq!(config.slider_names, vec!["a".to_string(), "b".to_string()]);
        assert!(config.invert_sliders);
        assert!(config.verbose);
        assert_eq!(config.noise_reduction.threshold(), 0.015);

        let stream = StreamConfig::new()
            .with_reload_reset_delay(Duration::from_millis(10))
            .with_subscriber_buffer(8)
            .with_delivery_policy(DeliveryPolicy::Backpressure {
                timeout: Duration::from_millis(5),
            });
        assert_eq!(stream.subscriber_buffer, 8);
        assert!(stream.validate().is_ok());
    }
}
