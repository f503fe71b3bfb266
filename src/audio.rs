//! Audio subsystem: media elements, the analyser and the audio graph service.
//!
//! The graph is the only owner of the output context and of the node chain
//! `source → analyser → gain → destination`; everything else reaches audio
//! through `AudioGraphService`.

mod analyser;
mod graph;
mod media;
mod platform;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use analyser::{Analyser, AnalyserTap};
pub use graph::AudioGraphService;
pub use media::{ElementSource, MediaElement};
pub use platform::{AudioContext, AudioPlatform, GraphInput, OutputNode, RodioPlatform};
pub use types::{BIN_COUNT, ContextState, FFT_SIZE, MediaEvent, SourceBox, clamp_volume};
