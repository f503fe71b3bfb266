//! Error taxonomy shared by the audio graph, playback and storage layers.
//!
//! None of these are fatal: playback errors end up as a status message in the
//! UI and storage errors are logged and replaced by defaults.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerError {
    /// No audio output device could be opened.
    #[error("audio output unavailable: {0}")]
    AudioUnavailable(String),
    /// The source → analyser → gain chain could not be built.
    #[error("could not build audio graph: {0}")]
    BindFailure(String),
    /// The output refused to start playback.
    #[error("playback rejected: {0}")]
    PlaybackRejected(String),
    /// The media could not be opened or decoded.
    #[error("could not decode media: {0}")]
    DecodeError(String),
    /// A persistence read or write failed.
    #[error("storage failure: {0}")]
    StorageFailure(String),
    /// An operation needed a bound node chain but none was connected.
    #[error("no audio graph is bound")]
    Unbound,
}

impl From<std::io::Error> for PlayerError {
    fn from(e: std::io::Error) -> Self {
        Self::StorageFailure(e.to_string())
    }
}

impl From<serde_json::Error> for PlayerError {
    fn from(e: serde_json::Error) -> Self {
        Self::StorageFailure(e.to_string())
    }
}
