//! Playback state machine and playlist navigation.

mod controller;
mod navigation;
mod state;

pub use controller::PlaybackController;
pub use navigation::{next_index, prev_index, shuffled_index};
pub use state::{PlaybackNotice, PlaybackState};
