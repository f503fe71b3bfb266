//! Audio-related small types and constants.
//!
//! This module defines the analyser geometry, the context power state and
//! the events a media element reports back to the playback controller.

use std::time::Duration;

/// Samples per analyser transform.
pub const FFT_SIZE: usize = 256;
/// Frequency bins produced per transform.
pub const BIN_COUNT: usize = FFT_SIZE / 2;

/// Clamp a gain level to [0, 1]; NaN is silence.
pub fn clamp_volume(level: f32) -> f32 {
    if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 1.0)
    }
}

/// Boxed decoded audio as handed to a media element.
pub type SourceBox = Box<dyn rodio::Source + Send>;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ContextState {
    /// Output is live.
    Running,
    /// Output is paused at the device level; `resume` brings it back.
    Suspended,
    /// Terminal; a new context must be created.
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Decoding started and the duration is known, if the container tells.
    MetadataReady { duration: Option<Duration> },
    /// Playback position advanced.
    TimeUpdate(Duration),
    /// The stream played to its natural end.
    Ended,
    /// Decoding or I/O failed mid-stream.
    Error(String),
}
