//! Raw reading normalization and noise filtering
//!
//! Converts a 10-bit ADC reading into a two-decimal position and decides
//! whether it differs enough from the last reported position to count as a
//! movement. Everything here is stateless.

use crate::types::SliderPercent;

/// Largest reading a 10-bit ADC produces
pub const RAW_MAX: i32 = 1023;

const PRECISION: f32 = 100.0;

/// Slack, in hundredths, absorbing f32 error when a threshold is itself a
/// whole number of hundredths
const THRESHOLD_TOLERANCE: f32 = 1e-3;

/// Round a position to two decimals.
pub fn round_percent(value: f32) -> f32 {
    (value * PRECISION).round() / PRECISION
}

/// Map a raw reading to a two-decimal position.
///
/// Negative readings clamp to 0.0. Readings above [`RAW_MAX`] are not clamped
/// and produce positions above 1.0.
pub fn normalize(raw: i32, invert: bool) -> f32 {
    let dirty = raw as f32 / RAW_MAX as f32;
    let scalar = round_percent(dirty.max(0.0));

    if invert {
        round_percent(1.0 - scalar)
    } else {
        scalar
    }
}

/// Whether `current` is a real movement away from `previous`.
///
/// An `Unknown` previous value always counts as different. Positions carry
/// two decimals, so the distance is compared in whole hundredths: a move of
/// exactly `threshold` is never reported.
pub fn significantly_different(previous: SliderPercent, current: f32, threshold: f32) -> bool {
    match previous {
        SliderPercent::Unknown => true,
        SliderPercent::Known(old) => {
            let hundredths = ((current - old).abs() * PRECISION).round();
            hundredths - threshold * PRECISION > THRESHOLD_TOLERANCE
        }
    }
}

/// Outcome of evaluating one raw reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub changed: bool,
    pub value: f32,
}

/// Normalization settings taken from the slider configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalizer {
    pub invert: bool,
    pub threshold: f32,
}

impl Normalizer {
    pub fn new(invert: bool, threshold: f32) -> Self {
        Self { invert, threshold }
    }

    /// Normalize `raw` and compare it against the tracked value.
    pub fn evaluate(&self, raw: i32, previous: SliderPercent) -> Decision {
        let value = normalize(raw, self.invert);
        Decision {
            changed: significantly_different(previous, value, self.threshold),
            value,
        }
    }
}
