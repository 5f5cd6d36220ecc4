//! Slider change detection
//!
//! Tracks the last reported position of every slider and turns each reading
//! vector into the move events it implies. A change in vector length resets
//! every slider to `Unknown`, so the following reading reports all of them.

use tracing::{debug, info};

use crate::config::SliderConfig;
use crate::normalizer::{Normalizer, RAW_MAX};
use crate::types::{SliderMoveEvent, SliderPercent};

/// Per-slider position tracking for one device
#[derive(Debug, Clone)]
pub struct ChangeDetector {
    normalizer: Normalizer,

    /// Slider count the tracked positions were sized for
    known_slider_count: usize,

    /// Last reported position per slider
    current: Vec<SliderPercent>,
}

impl ChangeDetector {
    /// Create a detector with no sliders tracked yet
    pub fn new(invert: bool, threshold: f32) -> Self {
        Self {
            normalizer: Normalizer::new(invert, threshold),
            known_slider_count: 0,
            current: Vec::new(),
        }
    }

    /// Create a detector using the inversion and noise settings of `config`
    pub fn from_config(config: &SliderConfig) -> Self {
        Self::new(config.invert_sliders, config.noise_reduction.threshold())
    }

    /// Replace inversion and noise settings, keeping tracked positions
    pub fn set_options(&mut self, invert: bool, threshold: f32) {
        self.normalizer = Normalizer::new(invert, threshold);
    }

    pub fn known_slider_count(&self) -> usize {
        self.known_slider_count
    }

    /// Tracked positions, index-aligned with the last accepted vector
    pub fn current(&self) -> &[SliderPercent] {
        &self.current
    }

    /// Forget the slider count so the next vector re-reports every slider
    pub fn reset_slider_count(&mut self) {
        self.known_slider_count = 0;
    }

    /// Process one reading vector and return the resulting move events
    ///
    /// Events are returned in ascending slider order. A vector whose first
    /// reading exceeds [`RAW_MAX`] is treated as a corrupted read and produces
    /// nothing.
    pub fn process(&mut self, vector: &[i32]) -> Vec<SliderMoveEvent> {
        let slider_count = vector.len();

        if slider_count != self.known_slider_count {
            info!("Detected {} sliders", slider_count);
            self.known_slider_count = slider_count;
            self.current = vec![SliderPercent::Unknown; slider_count];
        }

        // The device occasionally garbles the first reading of a cycle
        if let Some(&first) = vector.first() {
            if first > RAW_MAX {
                debug!("Got malformed readings, ignoring: {:?}", vector);
                return Vec::new();
            }
        }

        let mut events = Vec::new();

        for (slider_index, &raw) in vector.iter().enumerate() {
            let decision = self.normalizer.evaluate(raw, self.current[slider_index]);

            if decision.changed {
                self.current[slider_index] = SliderPercent::Known(decision.value);
                events.push(SliderMoveEvent::new(slider_index, decision.value));
            }
        }

        events
    }
}
