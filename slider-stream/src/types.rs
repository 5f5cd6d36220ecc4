//! Core types for the slider-stream crate.

use std::fmt;

/// Raw readings from one poll cycle, index-aligned with the configured sliders.
pub type ReadingVector = Vec<i32>;

/// A slider moved far enough to be reported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderMoveEvent {
    /// Position of the slider in the configured slider list
    pub slider_index: usize,
    /// Normalized position, rounded to two decimals
    pub percent_value: f32,
}

impl SliderMoveEvent {
    /// Create a new move event.
    pub fn new(slider_index: usize, percent_value: f32) -> Self {
        Self {
            slider_index,
            percent_value,
        }
    }
}

impl fmt::Display for SliderMoveEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slider {} -> {:.2}", self.slider_index, self.percent_value)
    }
}

/// Last percentage tracked for a slider.
///
/// `Unknown` marks a slider that has not been observed since the last reset,
/// so the next reading for it always counts as a move.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SliderPercent {
    /// Never observed since the slider count last changed
    #[default]
    Unknown,
    /// Last reported normalized value
    Known(f32),
}

impl SliderPercent {
    /// The tracked value, if any.
    pub fn value(&self) -> Option<f32> {
        match self {
            SliderPercent::Unknown => None,
            SliderPercent::Known(value) => Some(*value),
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, SliderPercent::Unknown)
    }
}

/// Lifecycle state of a slider connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// Not polling
    Idle,
    /// Poll loop running
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Idle => write!(f, "idle"),
            ConnectionState::Connected => write!(f, "connected"),
        }
    }
}
