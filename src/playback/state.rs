/// Lifecycle of the currently loaded track.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing loaded.
    #[default]
    Empty,
    /// Element created and bound; waiting for metadata.
    Loading,
    /// Metadata known, not started.
    Ready,
    Playing,
    Paused,
    /// Played to its natural end.
    Ended,
    /// Load or playback failed; pick another track to recover.
    Errored,
}

impl PlaybackState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Empty => "Stopped",
            Self::Loading => "Loading",
            Self::Ready => "Ready",
            Self::Playing => "Playing",
            Self::Paused => "Paused",
            Self::Ended => "Ended",
            Self::Errored => "Error",
        }
    }
}

/// Things the owner of the playlist has to react to.
#[derive(Clone, Debug, PartialEq)]
pub enum PlaybackNotice {
    /// First real duration for a track whose stored duration was unknown.
    DurationResolved { track_id: String, seconds: f64 },
    /// The track finished on its own.
    Ended { track_id: String },
    /// Playback failed; `message` is meant for the status line.
    Failed { message: String },
}
